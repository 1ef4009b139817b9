use std::fmt;

use crate::indicators::{BASE_MAP, LINE_LAYER, POINT_LAYER, POLYGON_LAYER};

/// Part of the layer stack delimited by the indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stratum {
    /// Beneath `base-map`.
    Base,
    /// Between `base-map` and `polygon-layer`.
    Polygon,
    /// Between `polygon-layer` and `line-layer`.
    Line,
    /// Between `line-layer` and `point-layer`.
    Point,
    /// Above `point-layer`.
    Top,
}

impl Stratum {
    const ALL: [Self; 5] = [Self::Base, Self::Polygon, Self::Line, Self::Point, Self::Top];

    fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Polygon => "polygon",
            Self::Line => "line",
            Self::Point => "point",
            Self::Top => "top",
        }
    }

    /// Indicator at the top of this stratum.
    fn ceiling(self) -> Option<&'static str> {
        match self {
            Self::Base => Some(BASE_MAP),
            Self::Polygon => Some(POLYGON_LAYER),
            Self::Line => Some(LINE_LAYER),
            Self::Point => Some(POINT_LAYER),
            Self::Top => None,
        }
    }
}

/// Layers of a session grouped by [`Stratum`]. Meant for humans, `Display` it to see the stack
/// from top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerOrder {
    /// Bottom to top, indexed by [`Stratum`].
    strata: [Vec<String>; 5],
}

impl LayerOrder {
    /// Split `layer_ids`, ordered bottom to top, at the indicators.
    pub(crate) fn new(layer_ids: impl IntoIterator<Item = String>) -> Self {
        let mut order = Self::default();
        let mut current = 0;

        for id in layer_ids {
            if let Some(index) = Stratum::ALL
                .iter()
                .position(|stratum| stratum.ceiling() == Some(id.as_str()))
            {
                current = index + 1;
            } else {
                order.strata[current].push(id);
            }
        }

        order
    }

    /// Layers of `stratum`, bottom to top.
    pub fn layers(&self, stratum: Stratum) -> &[String] {
        &self.strata[stratum as usize]
    }
}

impl fmt::Display for LayerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stratum in Stratum::ALL.iter().rev() {
            writeln!(f, "{}:", stratum.name())?;
            for id in self.layers(*stratum).iter().rev() {
                writeln!(f, "  {id}")?;
            }
        }
        Ok(())
    }
}
