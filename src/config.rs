use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::grid::TimeGrid;
use crate::timeline::{Palette, RenderHints, Rgba};
use crate::visibility::{GroundStation, DEFAULT_MIN_ELEVATION_DEG};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub stations: Vec<StationConfig>,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_min_elevation() -> f64 {
    DEFAULT_MIN_ELEVATION_DEG
}

fn default_threads() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_duration")]
    pub span: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub id: String,
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default = "default_station_color")]
    pub color: Rgba,
}

fn default_station_color() -> Rgba {
    Rgba::WHITE
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_document_name")]
    pub name: String,
    #[serde(default)]
    pub hints: RenderHints,
    #[serde(default)]
    pub palette: Palette,
}

fn default_document_name() -> String {
    "Satellite Visibility".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            name: default_document_name(),
            hints: RenderHints::default(),
            palette: Palette::default(),
        }
    }
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

fn deserialize_duration<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let s = String::deserialize(d)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        if config.threads == 0 {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn stations(&self) -> Result<Vec<GroundStation>, ConfigError> {
        let mut seen = HashSet::new();
        self.stations
            .iter()
            .map(|s| {
                if !seen.insert(s.id.as_str()) {
                    return Err(ConfigError::Invalid(format!("duplicate station id {}", s.id)));
                }
                let name = s.name.as_deref().unwrap_or(&s.id);
                GroundStation::from_coordinates(&s.id, name, &s.coordinates, s.color).ok_or_else(
                    || {
                        ConfigError::Invalid(format!(
                            "station {}: bad coordinates '{}'",
                            s.id, s.coordinates
                        ))
                    },
                )
            })
            .collect()
    }

    pub fn grid(&self) -> Result<TimeGrid, ConfigError> {
        TimeGrid::new(self.run.start, self.run.span, self.run.step)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
