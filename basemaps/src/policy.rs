//! Where layers land in the stack when they are added to a session.

use crate::{
    indicators::{LINE_LAYER, POINT_LAYER, POLYGON_LAYER},
    renderer::{Renderer, RendererError},
    style::Layer,
};

/// Stacking category of a layer, derived from its rendering type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Polygon,
    Line,
    Point,
}

impl Category {
    /// Classify a layer type. Unknown types are treated as polygons, as those sit lowest among
    /// the overlays.
    pub fn of(layer_type: &str) -> Self {
        Self::known(layer_type).unwrap_or(Self::Polygon)
    }

    /// Category of a layer type listed in the classification table.
    pub fn known(layer_type: &str) -> Option<Self> {
        match layer_type {
            "fill" | "fill-extrusion" | "heatmap" | "background" | "raster" | "raster-particle" => {
                Some(Self::Polygon)
            }
            "line" => Some(Self::Line),
            "symbol" | "circle" => Some(Self::Point),
            _ => None,
        }
    }

    /// Indicator beneath which layers of this category are inserted.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Polygon => POLYGON_LAYER,
            Self::Line => LINE_LAYER,
            Self::Point => POINT_LAYER,
        }
    }
}

/// Where to put a layer added to a [`crate::Session`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    /// Beneath the indicator of the layer's [`Category`].
    #[default]
    Auto,

    /// Directly beneath the given layer. Empty id means [`Placement::Auto`].
    Beneath(String),

    /// Above everything else, indicators included.
    Top,
}

impl Placement {
    pub fn beneath(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Self::Auto
        } else {
            Self::Beneath(id)
        }
    }

    /// Whether the anchor is picked from the layer's [`Category`].
    pub fn is_auto(&self) -> bool {
        match self {
            Self::Auto => true,
            Self::Beneath(id) => id.is_empty(),
            Self::Top => false,
        }
    }

    /// Id of the layer the new one should be inserted before, `None` meaning the very top.
    pub fn anchor<'a>(&'a self, layer_type: &str) -> Option<&'a str> {
        match self {
            Self::Top => None,
            Self::Beneath(id) if !id.is_empty() => Some(id.as_str()),
            Self::Auto | Self::Beneath(_) => Some(Category::of(layer_type).indicator()),
        }
    }
}

impl From<Option<&str>> for Placement {
    fn from(beneath: Option<&str>) -> Self {
        beneath.map_or(Self::Auto, Self::beneath)
    }
}

/// Add `layer` to the renderer at the position dictated by `placement`. This is the only way
/// layers get into a session's renderer after the indicators are installed.
pub(crate) fn insert(
    renderer: &mut impl Renderer,
    layer: Layer,
    placement: &Placement,
) -> Result<(), RendererError> {
    if placement.is_auto() && Category::known(&layer.kind).is_none() {
        log::warn!(
            "Layer '{}' has unknown type '{}', stacking it with polygons.",
            layer.id,
            layer.kind
        );
    }

    let anchor = placement.anchor(&layer.kind);
    log::trace!("Inserting '{}' beneath {anchor:?}.", layer.id);
    renderer.add_layer(layer, anchor)
}
