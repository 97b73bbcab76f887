use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeline::iso_seconds;
use crate::visibility::aggregator::{VisibilityEvent, VisibilityReport};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("visibility summary IO error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("visibility summary JSON error ({path}): {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEvent {
    #[serde(with = "iso_seconds")]
    pub timestamp: DateTime<Utc>,
    pub elevation: f64,
}

/// Interchange form of a visibility run: station id → object id → events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilitySummary {
    pub stations: BTreeMap<String, BTreeMap<String, Vec<SummaryEvent>>>,
}

impl VisibilitySummary {
    pub fn from_report(report: &VisibilityReport) -> Self {
        let mut stations: BTreeMap<String, BTreeMap<String, Vec<SummaryEvent>>> = BTreeMap::new();
        for (key, window) in &report.windows {
            stations
                .entry(key.station_id.clone())
                .or_default()
                .insert(
                    key.object_id.clone(),
                    window
                        .events
                        .iter()
                        .map(|e| SummaryEvent {
                            timestamp: e.instant,
                            elevation: e.elevation_deg,
                        })
                        .collect(),
                );
        }
        Self { stations }
    }

    pub fn events(&self) -> Vec<VisibilityEvent> {
        self.stations
            .iter()
            .flat_map(|(station_id, objects)| {
                objects.iter().flat_map(move |(object_id, events)| {
                    events.iter().map(move |e| VisibilityEvent {
                        station_id: station_id.clone(),
                        object_id: object_id.clone(),
                        instant: e.timestamp,
                        elevation_deg: e.elevation,
                    })
                })
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<(), SummaryError> {
        let io_err = |source| SummaryError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| SummaryError::Json {
            path: path.display().to_string(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let file = File::open(path).map_err(|source| SummaryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SummaryError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}
