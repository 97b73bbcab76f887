use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::elements::OrbitalElementSet;
use crate::grid::TimeGrid;
use crate::propagate::error::PropagationError;
use crate::propagate::frames::{ecef_to_geodetic, gmst, teme_to_ecef_position};
use crate::propagate::propagator::Propagator;

/// Geodetic point beneath an object, altitude in km above the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subpoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteState {
    pub instant: DateTime<Utc>,
    pub subpoint: Subpoint,
    pub ecef_km: [f64; 3],
}

/// Propagated samples of one object, in grid order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTrack {
    pub object_id: String,
    pub states: Vec<SatelliteState>,
}

impl GroundTrack {
    pub fn state_at(&self, instant: DateTime<Utc>) -> Option<&SatelliteState> {
        self.states
            .binary_search_by_key(&instant, |s| s.instant)
            .ok()
            .map(|i| &self.states[i])
    }
}

pub struct GeodeticProjector<'a, P: Propagator> {
    propagator: &'a P,
}

impl<'a, P: Propagator> GeodeticProjector<'a, P> {
    pub fn new(propagator: &'a P) -> Self {
        Self { propagator }
    }

    pub fn project(
        &self,
        set: &OrbitalElementSet,
        instant: DateTime<Utc>,
    ) -> Result<SatelliteState, PropagationError> {
        let teme = self.propagator.propagate(set, instant)?;
        let ecef_km = teme_to_ecef_position(teme.position_km, gmst(instant));
        if ecef_km.iter().any(|c| !c.is_finite()) {
            return Err(PropagationError::new(
                &set.id,
                instant,
                "non-finite position",
            ));
        }
        let (latitude_deg, longitude_deg, altitude_km) = ecef_to_geodetic(ecef_km);

        Ok(SatelliteState {
            instant,
            subpoint: Subpoint {
                latitude_deg,
                longitude_deg,
                altitude_km,
            },
            ecef_km,
        })
    }

    /// Project every grid instant, skipping samples that fail to propagate.
    pub fn ground_track(&self, set: &OrbitalElementSet, grid: &TimeGrid) -> GroundTrack {
        let instants = grid.instants();
        let mut states = Vec::with_capacity(instants.len());
        let mut failures = 0usize;

        for instant in instants {
            match self.project(set, instant) {
                Ok(state) => states.push(state),
                Err(e) => {
                    if failures == 0 {
                        log::warn!("{}", e);
                    }
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            log::warn!(
                "Skipped {} of {} samples for {}",
                failures,
                grid.len(),
                set.id
            );
        }
        log::debug!("Ground track for {}: {} samples", set.id, states.len());

        GroundTrack {
            object_id: set.id.clone(),
            states,
        }
    }
}
