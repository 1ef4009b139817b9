//! Invisible layers marking the stacking boundaries of a session.

use crate::{
    renderer::{Renderer, RendererError},
    style::Layer,
};

/// Base styles are inserted beneath this one.
pub const BASE_MAP: &str = "base-map";
pub const POLYGON_LAYER: &str = "polygon-layer";
pub const LINE_LAYER: &str = "line-layer";
pub const POINT_LAYER: &str = "point-layer";

/// All indicators, bottom to top.
pub const INDICATORS: [&str; 4] = [BASE_MAP, POLYGON_LAYER, LINE_LAYER, POINT_LAYER];

pub fn is_indicator(id: &str) -> bool {
    INDICATORS.contains(&id)
}

fn indicator_layer(id: &str) -> Layer {
    Layer::new(id, "background").with_paint("background-opacity", 0)
}

/// Append the indicators to the top of the (empty) renderer. Must happen before any other layer
/// is added, otherwise the stacking order is undefined.
pub(crate) fn install(renderer: &mut impl Renderer) -> Result<(), RendererError> {
    for id in INDICATORS {
        match renderer.add_layer(indicator_layer(id), None) {
            Ok(()) => {}
            Err(RendererError::DuplicateLayer(_)) => {
                log::debug!("Indicator '{id}' is already there.");
            }
            Err(error) => return Err(error),
        }
    }
    Ok(())
}
