mod aggregator;
mod evaluator;
mod station;
mod summary;

pub use aggregator::{aggregate, PairKey, VisibilityEvent, VisibilityReport, VisibilityWindow};
pub use evaluator::{
    evaluate_pair, is_visible, LookAngles, TopocentricFrame, VisibilitySample,
    DEFAULT_MIN_ELEVATION_DEG,
};
pub use station::GroundStation;
pub use summary::{SummaryError, SummaryEvent, VisibilitySummary};
