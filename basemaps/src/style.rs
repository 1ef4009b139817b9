//! Style documents. Loosely based on MapLibre's style specification, but only the parts needed
//! to move sources and layers around are typed. Everything else, including paint and layout
//! expressions, is carried verbatim.
//! <https://maplibre.org/maplibre-style-spec/>

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the style specification written into documents created by this crate.
const STYLE_VERSION: u8 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("'{url}' is not a style document: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },
    #[error("'{url}' defines layer '{id}' more than once")]
    DuplicateLayer { url: String, id: String },
}

/// Sources and layers of a map style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    pub sources: Map<String, Value>,
    pub layers: Vec<Layer>,

    /// Keys this crate does not care about, such as `center` or `terrain`.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

fn default_version() -> u8 {
    STYLE_VERSION
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self {
            version: STYLE_VERSION,
            name: None,
            glyphs: None,
            sprite: None,
            sources: Map::new(),
            layers: Vec::new(),
            other: Map::new(),
        }
    }
}

impl StyleDocument {
    /// Parse a payload fetched from `url`.
    pub fn from_slice(url: &str, payload: &[u8]) -> Result<Self, ParseError> {
        let document: Self = serde_json::from_slice(payload).map_err(|source| ParseError::Json {
            url: url.to_owned(),
            source,
        })?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = document
            .layers
            .iter()
            .find(|layer| !seen.insert(layer.id.as_str()))
        {
            return Err(ParseError::DuplicateLayer {
                url: url.to_owned(),
                id: duplicate.id.clone(),
            });
        }

        Ok(document)
    }

    /// Append `other` to this document. Its layers go after the existing ones, and its sources
    /// replace existing ones with the same id.
    pub fn merge(&mut self, other: Self) {
        self.sources.extend(other.sources);
        self.layers.extend(other.layers);
    }
}

/// Whether a layer is drawn. Stored under `layout.visibility`, absence meaning visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    #[serde(rename = "none")]
    Hidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "none",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,

    /// Rendering type, e.g. `fill`, `line` or `symbol`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(
        rename = "source-layer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Layer {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            source: None,
            source_layer: None,
            layout: Map::new(),
            paint: Map::new(),
            other: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_paint(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.paint.insert(property.into(), value.into());
        self
    }

    pub fn visibility(&self) -> Visibility {
        match self.layout.get("visibility").and_then(Value::as_str) {
            Some("none") => Visibility::Hidden,
            _ => Visibility::Visible,
        }
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.layout
            .insert("visibility".to_owned(), visibility.as_str().into());
    }

    /// Background layer which does not contribute any pixels.
    pub fn is_transparent_background(&self) -> bool {
        self.kind == "background"
            && self
                .paint
                .get("background-opacity")
                .and_then(Value::as_f64)
                .is_some_and(|opacity| opacity <= 0.0)
    }

    /// Id under which this layer lives in a session shared with other styles.
    pub(crate) fn physical_id(style: &str, id: &str) -> String {
        format!("{style}-{id}")
    }

    pub(crate) fn namespaced(mut self, style: &str) -> Self {
        self.id = Self::physical_id(style, &self.id);
        self
    }
}
