use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// One object's two-line element record, parsed and checked.
#[derive(Debug, Clone)]
pub struct OrbitalElementSet {
    pub id: String,
    pub name: Option<String>,
    pub epoch: DateTime<Utc>,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
    pub line1: String,
    pub line2: String,
    pub elements: sgp4::Elements,
}

impl OrbitalElementSet {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Satellite {}", self.id))
    }
}

/// Element sets keyed by identifier. Ordered so every stage iterates the same way.
pub type ElementCatalog = BTreeMap<String, OrbitalElementSet>;
