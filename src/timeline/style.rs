use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::elements::ElementCatalog;

/// RGBA color, passed through to the renderer as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);
    pub const GREEN: Rgba = Rgba([0, 255, 0, 255]);
    pub const CYAN: Rgba = Rgba([0, 255, 255, 255]);

    /// KML `aabbggrr` hex.
    pub fn to_kml_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        format!("{:02x}{:02x}{:02x}{:02x}", a, b, g, r)
    }
}

const RING_TOLERANCE_DEG: f64 = 1e-6;

/// Discrete orbital ring, recognized from the raw inclination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Ring {
    #[strum(serialize = "ring-60")]
    Inclined60,
    #[strum(serialize = "ring-120")]
    Inclined120,
}

impl Ring {
    /// `None` for any inclination outside the known rings.
    pub fn classify(inclination_deg: f64) -> Option<Ring> {
        if (inclination_deg - 60.0).abs() < RING_TOLERANCE_DEG {
            Some(Ring::Inclined60)
        } else if (inclination_deg - 120.0).abs() < RING_TOLERANCE_DEG {
            Some(Ring::Inclined120)
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Ring::Inclined60 => 0,
            Ring::Inclined120 => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackColoring {
    #[default]
    Fixed,
    Rings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackStyle {
    pub name: String,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub coloring: TrackColoring,
    pub track_color: Rgba,
    pub ring_colors: [Rgba; 2],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            coloring: TrackColoring::Fixed,
            track_color: Rgba::RED,
            ring_colors: [Rgba::GREEN, Rgba::CYAN],
        }
    }
}

impl Palette {
    pub fn color_for(&self, inclination_deg: f64) -> Rgba {
        match self.coloring {
            TrackColoring::Fixed => self.track_color,
            TrackColoring::Rings => Ring::classify(inclination_deg)
                .map(|ring| self.ring_colors[ring.index()])
                .unwrap_or(self.track_color),
        }
    }

    pub fn styles(&self, catalog: &ElementCatalog) -> BTreeMap<String, TrackStyle> {
        catalog
            .values()
            .map(|set| {
                let color = self.color_for(set.inclination_deg);
                if self.coloring == TrackColoring::Rings && Ring::classify(set.inclination_deg).is_none() {
                    log::debug!(
                        "{} inclination {:.4} is not a known ring, using default color",
                        set.id,
                        set.inclination_deg
                    );
                }
                (
                    set.id.clone(),
                    TrackStyle {
                        name: set.display_name(),
                        color,
                    },
                )
            })
            .collect()
    }
}
