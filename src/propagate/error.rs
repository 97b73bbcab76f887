use chrono::{DateTime, Utc};
use thiserror::Error;

/// A single (object, instant) sample that could not be propagated.
#[derive(Debug, Clone, Error)]
#[error("propagation failed for {object_id} at {}: {message}", .instant.format("%Y-%m-%dT%H:%M:%SZ"))]
pub struct PropagationError {
    pub object_id: String,
    pub instant: DateTime<Utc>,
    pub message: String,
}

impl PropagationError {
    pub fn new(object_id: &str, instant: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            object_id: object_id.to_string(),
            instant,
            message: message.into(),
        }
    }
}
