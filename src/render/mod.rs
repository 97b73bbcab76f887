mod czml;
mod error;
mod kml;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use strum_macros::Display;

use crate::timeline::TimelineDocument;

pub use czml::CzmlSerializer;
pub use error::SerializationError;
pub use kml::KmlSerializer;

/// Turns an assembled timeline into bytes of one concrete markup.
pub trait GeoSerializer {
    fn render(&self, doc: &TimelineDocument) -> Result<Vec<u8>, SerializationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Time-dynamic animation markup
    Czml,
    /// Static placemark markup
    Kml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Czml => "czml",
            OutputFormat::Kml => "kml",
        }
    }
}

pub fn render(doc: &TimelineDocument, format: OutputFormat) -> Result<Vec<u8>, SerializationError> {
    match format {
        OutputFormat::Czml => CzmlSerializer.render(doc),
        OutputFormat::Kml => KmlSerializer.render(doc),
    }
}

pub fn write_document(path: &Path, bytes: &[u8]) -> Result<(), SerializationError> {
    let io_err = |source| SerializationError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
