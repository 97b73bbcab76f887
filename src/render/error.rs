use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("CZML encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("KML encoding error: {0}")]
    Xml(String),
    #[error("output write error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
