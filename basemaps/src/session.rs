use serde_json::Value;

use crate::{
    indicators::{self, BASE_MAP},
    order::LayerOrder,
    policy::{self, Placement},
    registry::Registry,
    renderer::{Renderer, RendererError},
    style::{Layer, StyleDocument, Visibility},
    visibility,
};

/// Renderer with all base styles loaded, created by [`crate::StyleManager::create_session`].
///
/// Exactly one base style is visible at a time. Layers added through the session are stacked
/// above all base styles, according to their [`Placement`].
#[derive(Debug)]
pub struct Session<R> {
    renderer: R,
    registry: Registry,
}

impl<R: Renderer> Session<R> {
    pub(crate) fn new(renderer: R, registry: Registry) -> Self {
        Self { renderer, registry }
    }

    /// Read-only access to the renderer. Modifications have to go through the session.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Show `style` and hide all other base styles. Switching to an unknown style hides all
    /// of them.
    pub fn change_base_style(&mut self, style: &str) {
        log::info!("Changing base style to '{style}'.");
        visibility::activate(&mut self.renderer, &mut self.registry, style);
    }

    pub fn active_style(&self) -> Option<&str> {
        self.registry.active()
    }

    /// Add an overlay layer. Layer whose id is already taken is skipped.
    pub fn add_layer(&mut self, layer: Layer, placement: Placement) -> Result<(), RendererError> {
        let id = layer.id.clone();
        match policy::insert(&mut self.renderer, layer, &placement) {
            Ok(()) => Ok(()),
            Err(RendererError::DuplicateLayer(_)) => {
                log::warn!("Layer '{id}' already exists, skipping.");
                Ok(())
            }
            Err(error) => {
                log::error!("Could not add layer '{id}': {error}");
                Err(error)
            }
        }
    }

    /// Extend base style `style` with `layer`. It is stacked together with the other base
    /// layers, and is visible only when `style` is active. A layer whose physical id is already
    /// taken is skipped, and the style is not registered then.
    pub fn add_single_layer_to_basemap(
        &mut self,
        style: &str,
        layer: Layer,
    ) -> Result<(), RendererError> {
        let mut layer = layer.namespaced(style);
        if !is_free(&self.renderer, &layer.id) {
            return Ok(());
        }

        layer.set_visibility(if self.registry.active() == Some(style) {
            Visibility::Visible
        } else {
            Visibility::Hidden
        });

        let id = layer.id.clone();
        policy::insert(&mut self.renderer, layer, &Placement::beneath(BASE_MAP))?;
        self.registry.record_layer(style, id);
        Ok(())
    }

    pub fn add_source(&mut self, id: &str, source: Value) -> Result<(), RendererError> {
        self.renderer.add_source(id, source)
    }

    pub fn source(&self, id: &str) -> Option<Value> {
        self.renderer.source(id)
    }

    pub fn layer(&self, id: &str) -> Option<Layer> {
        self.renderer.layer(id)
    }

    /// Remove an overlay layer. Indicators and base style layers stay where they are.
    pub fn remove_layer(&mut self, id: &str) -> Result<(), RendererError> {
        if indicators::is_indicator(id) || self.registry.owns(id) {
            return Err(RendererError::ProtectedLayer(id.to_owned()));
        }
        self.renderer.remove_layer(id)
    }

    pub fn set_layer_visibility(
        &mut self,
        id: &str,
        visibility: Visibility,
    ) -> Result<(), RendererError> {
        self.renderer.set_layer_visibility(id, visibility)
    }

    pub fn style(&self) -> StyleDocument {
        self.renderer.style()
    }

    /// Names of all base styles, in the order they were declared.
    pub fn declared_styles(&self) -> Vec<&str> {
        self.registry.styles().map(|(name, _)| name).collect()
    }

    /// Physical ids of layers of one base style.
    pub fn layers_of(&self, style: &str) -> &[String] {
        self.registry.layers_of(style)
    }

    /// Physical ids of layers of all base styles.
    pub fn owned_layer_ids(&self) -> Vec<&str> {
        self.registry
            .styles()
            .flat_map(|(_, layers)| layers.iter().map(String::as_str))
            .collect()
    }

    /// Ids of all layers in the renderer, bottom to top.
    pub fn all_layer_ids(&self) -> Vec<String> {
        self.renderer
            .style()
            .layers
            .into_iter()
            .map(|layer| layer.id)
            .collect()
    }

    /// Layers which neither belong to a base style nor are indicators, bottom to top.
    pub fn overlay_layer_ids(&self) -> Vec<String> {
        let owned = self.registry.owned_layer_ids();
        self.all_layer_ids()
            .into_iter()
            .filter(|id| !owned.contains(id.as_str()) && !indicators::is_indicator(id))
            .collect()
    }

    /// Layers which draw something, bottom to top.
    pub fn visible_layer_ids(&self) -> Vec<String> {
        self.renderer
            .style()
            .layers
            .into_iter()
            .filter(|layer| {
                layer.visibility() == Visibility::Visible && !layer.is_transparent_background()
            })
            .map(|layer| layer.id)
            .collect()
    }

    pub fn visible_overlay_layer_ids(&self) -> Vec<String> {
        let owned = self.registry.owned_layer_ids();
        self.visible_layer_ids()
            .into_iter()
            .filter(|id| !owned.contains(id.as_str()) && !indicators::is_indicator(id))
            .collect()
    }

    /// Stacking order of the layers, grouped by the indicators. For diagnostics only.
    pub fn dump_layer_order(&self) -> LayerOrder {
        let order = LayerOrder::new(self.all_layer_ids());
        log::debug!("Layer order:\n{order}");
        order
    }
}

/// Whether a base layer with physical id `id` can be added. Collisions with indicators are
/// logged as warnings, other taken ids at debug level.
pub(crate) fn is_free(renderer: &impl Renderer, id: &str) -> bool {
    if indicators::is_indicator(id) {
        log::warn!("Base layer '{id}' collides with an indicator layer, skipping.");
        false
    } else if renderer.layer(id).is_some() {
        log::debug!("Layer '{id}' is already there, skipping.");
        false
    } else {
        true
    }
}
