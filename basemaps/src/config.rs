use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, Visitor},
};

use crate::{io::HttpOptions, style::StyleDocument};

/// Where a style's document(s) live. Multiple documents are merged in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSource {
    One(String),
    Many(Vec<String>),
}

impl StyleSource {
    pub fn urls(&self) -> &[String] {
        match self {
            Self::One(url) => std::slice::from_ref(url),
            Self::Many(urls) => urls,
        }
    }
}

impl From<&str> for StyleSource {
    fn from(url: &str) -> Self {
        Self::One(url.to_owned())
    }
}

impl From<String> for StyleSource {
    fn from(url: String) -> Self {
        Self::One(url)
    }
}

impl From<Vec<String>> for StyleSource {
    fn from(urls: Vec<String>) -> Self {
        Self::Many(urls)
    }
}

impl<const N: usize> From<[&str; N]> for StyleSource {
    fn from(urls: [&str; N]) -> Self {
        Self::Many(urls.into_iter().map(str::to_owned).collect())
    }
}

/// Base styles known to a [`crate::StyleManager`], in the order they get loaded.
///
/// Deserializes from a map of style names to either a single URL or a list of URLs:
///
/// ```
/// let declarations: basemaps::StyleDeclarations = serde_json::from_str(r#"{
///     "streets": "https://example.com/streets.json",
///     "satellite": ["https://example.com/imagery.json", "https://example.com/labels.json"]
/// }"#).unwrap();
///
/// assert_eq!(declarations.names().collect::<Vec<_>>(), ["streets", "satellite"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    styles: Vec<(String, StyleSource)>,
}

impl StyleDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, name: impl Into<String>, source: impl Into<StyleSource>) -> Self {
        self.insert(name, source);
        self
    }

    /// Declare a style. Declaring the same name again replaces its source, but keeps its place.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<StyleSource>) {
        let name = name.into();
        let source = source.into();
        match self.styles.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = source,
            None => self.styles.push((name, source)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleSource)> {
        self.styles
            .iter()
            .map(|(name, source)| (name.as_str(), source))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl<'de> Deserialize<'de> for StyleDeclarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclarationsVisitor;

        impl<'de> Visitor<'de> for DeclarationsVisitor {
            type Value = StyleDeclarations;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of style names to one or more document URLs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut declarations = StyleDeclarations::new();
                while let Some((name, source)) = map.next_entry::<String, StyleSource>()? {
                    declarations.insert(name, source);
                }
                Ok(declarations)
            }
        }

        deserializer.deserialize_map(DeclarationsVisitor)
    }
}

/// Configuration shared by all sessions of a [`crate::StyleManager`].
#[derive(Clone, Debug, Default)]
pub struct ManagerOptions {
    /// Glyphs URL template of the session, e.g. `https://example.com/fonts/{fontstack}/{range}.pbf`.
    pub glyphs: Option<String>,

    /// Sprite URL of the session.
    pub sprite: Option<String>,

    pub http: HttpOptions,
}

impl ManagerOptions {
    /// Style a renderer is opened with, before any base style is loaded.
    pub(crate) fn blank_style(&self) -> StyleDocument {
        StyleDocument {
            glyphs: self.glyphs.clone(),
            sprite: self.sprite.clone(),
            ..StyleDocument::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_preserved() {
        let declarations: StyleDeclarations =
            serde_json::from_str(r#"{"z": "z.json", "a": "a.json", "m": ["m1.json", "m2.json"]}"#)
                .unwrap();

        assert_eq!(declarations.names().collect::<Vec<_>>(), ["z", "a", "m"]);
        assert_eq!(
            declarations.iter().last().map(|(_, source)| source.urls()),
            Some(&["m1.json".to_owned(), "m2.json".to_owned()][..])
        );
    }

    #[test]
    fn redeclaring_replaces_source_in_place() {
        let declarations = StyleDeclarations::new()
            .with_style("a", "old.json")
            .with_style("b", "b.json")
            .with_style("a", ["new1.json", "new2.json"]);

        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            declarations.iter().next().map(|(_, source)| source.urls().len()),
            Some(2)
        );
    }

    #[test]
    fn invalid_source_is_rejected() {
        let result = serde_json::from_str::<StyleDeclarations>(r#"{"a": 42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_style_carries_glyphs_and_sprite() {
        let options = ManagerOptions {
            glyphs: Some("https://fonts/{fontstack}/{range}.pbf".to_owned()),
            sprite: Some("https://sprites/basic".to_owned()),
            ..Default::default()
        };

        let style = options.blank_style();

        assert_eq!(style.glyphs, options.glyphs);
        assert_eq!(style.sprite, options.sprite);
        assert!(style.sources.is_empty());
        assert!(style.layers.is_empty());
    }
}
