mod error;
pub mod frames;
mod projector;
mod propagator;

pub use error::PropagationError;
pub use projector::{GeodeticProjector, GroundTrack, SatelliteState, Subpoint};
pub use propagator::{Propagator, Sgp4Propagator, TemeState};
