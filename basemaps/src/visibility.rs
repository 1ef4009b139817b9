//! Switching between base styles.

use crate::{registry::Registry, renderer::Renderer, style::Visibility};

/// Show layers of `style` and hide layers of every other registered style. Activating a style
/// which was not registered yet registers it empty, so all base layers end up hidden.
pub(crate) fn activate(renderer: &mut impl Renderer, registry: &mut Registry, style: &str) {
    if !registry.contains(style) {
        log::warn!("Style '{style}' is not declared, hiding all base layers.");
        registry.register(style);
    }

    for (name, layers) in registry.styles() {
        let visibility = if name == style {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };

        log::debug!("Setting {} layer(s) of '{name}' to {visibility:?}.", layers.len());

        for id in layers {
            if let Err(error) = renderer.set_layer_visibility(id, visibility) {
                log::warn!("Could not update visibility of '{id}': {error}");
            }
        }
    }

    registry.set_active(style);
}
