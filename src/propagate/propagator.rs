use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sgp4::Constants;

use crate::elements::{ElementCatalog, OrbitalElementSet};
use crate::propagate::error::PropagationError;

/// Inertial (TEME) state returned by a propagator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemeState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Maps (element set, instant) to an inertial state.
pub trait Propagator: Sync {
    fn propagate(
        &self,
        set: &OrbitalElementSet,
        instant: DateTime<Utc>,
    ) -> Result<TemeState, PropagationError>;
}

/// SGP4/SDP4 via the `sgp4` crate, with constants prepared once per object.
pub struct Sgp4Propagator {
    constants: HashMap<String, Result<Constants, String>>,
}

impl Sgp4Propagator {
    pub fn new(catalog: &ElementCatalog) -> Self {
        let constants = catalog
            .values()
            .map(|set| {
                let prepared = Constants::from_elements(&set.elements).map_err(|e| e.to_string());
                if let Err(e) = &prepared {
                    log::warn!("Element set {} cannot be propagated: {}", set.id, e);
                }
                (set.id.clone(), prepared)
            })
            .collect();
        Self { constants }
    }
}

impl Propagator for Sgp4Propagator {
    fn propagate(
        &self,
        set: &OrbitalElementSet,
        instant: DateTime<Utc>,
    ) -> Result<TemeState, PropagationError> {
        let err = |message: String| PropagationError::new(&set.id, instant, message);

        let constants = match self.constants.get(&set.id) {
            Some(Ok(c)) => c,
            Some(Err(e)) => return Err(err(e.clone())),
            None => return Err(err("element set not prepared".into())),
        };

        let minutes = set
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| err(e.to_string()))?;

        let prediction = constants
            .propagate(minutes)
            .map_err(|e| err(e.to_string()))?;

        Ok(TemeState {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}
