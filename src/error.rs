use thiserror::Error;

use crate::config::ConfigError;
use crate::elements::ParseError;
use crate::grid::GridError;
use crate::pipeline::PipelineError;
use crate::proximity::ProximityError;
use crate::render::SerializationError;
use crate::visibility::SummaryError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Elements(#[from] ParseError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Proximity(#[from] ProximityError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error("unknown object {0}")]
    UnknownObject(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
