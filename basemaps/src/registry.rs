use std::collections::HashSet;

#[derive(Debug)]
struct Entry {
    name: String,
    layers: Vec<String>,
}

/// Which physical layers belong to which base style. Entries are never removed nor reordered.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    styles: Vec<Entry>,
    active: Option<String>,
}

impl Registry {
    /// Make sure that `style` has an entry, possibly empty.
    pub fn register(&mut self, style: &str) {
        if !self.contains(style) {
            self.styles.push(Entry {
                name: style.to_owned(),
                layers: Vec::new(),
            });
        }
    }

    pub fn contains(&self, style: &str) -> bool {
        self.styles.iter().any(|entry| entry.name == style)
    }

    pub fn record_layer(&mut self, style: &str, id: String) {
        self.register(style);
        if let Some(entry) = self.styles.iter_mut().find(|entry| entry.name == style) {
            entry.layers.push(id);
        }
    }

    pub fn layers_of(&self, style: &str) -> &[String] {
        self.styles
            .iter()
            .find(|entry| entry.name == style)
            .map(|entry| entry.layers.as_slice())
            .unwrap_or_default()
    }

    /// Styles with their layers, in registration order.
    pub fn styles(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.styles
            .iter()
            .map(|entry| (entry.name.as_str(), entry.layers.as_slice()))
    }

    pub fn owned_layer_ids(&self) -> HashSet<&str> {
        self.styles
            .iter()
            .flat_map(|entry| entry.layers.iter().map(String::as_str))
            .collect()
    }

    pub fn owns(&self, id: &str) -> bool {
        self.styles
            .iter()
            .any(|entry| entry.layers.iter().any(|layer| layer == id))
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_active(&mut self, style: &str) {
        self.active = Some(style.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut registry = Registry::default();
        registry.register("a");
        registry.record_layer("a", "a-x".to_owned());
        registry.register("a");

        assert_eq!(registry.styles().count(), 1);
        assert_eq!(registry.layers_of("a"), ["a-x"]);
    }

    #[test]
    fn layers_keep_recording_order() {
        let mut registry = Registry::default();
        for id in ["a-3", "a-1", "a-2"] {
            registry.record_layer("a", id.to_owned());
        }

        assert_eq!(registry.layers_of("a"), ["a-3", "a-1", "a-2"]);
    }

    #[test]
    fn unknown_style_owns_nothing() {
        let registry = Registry::default();
        assert!(registry.layers_of("nope").is_empty());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn owned_ids_span_all_styles() {
        let mut registry = Registry::default();
        registry.record_layer("streets", "streets-water".to_owned());
        registry.record_layer("satellite", "satellite-water".to_owned());

        let owned = registry.owned_layer_ids();
        assert_eq!(owned.len(), 2);
        assert!(registry.owns("streets-water"));
        assert!(registry.owns("satellite-water"));
        assert!(!registry.owns("water"));
    }

    #[test]
    fn styles_are_listed_in_registration_order() {
        let mut registry = Registry::default();
        registry.register("b");
        registry.register("a");
        registry.register("c");

        let names: Vec<_> = registry.styles().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
