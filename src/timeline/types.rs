use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::style::Rgba;

pub const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%SZ";

/// `YYYY-MM-DDTHH:MM:SSZ`, with a fractional part only when the instant has one.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde helper for `YYYY-MM-DDTHH:MM:SS[.fff]Z` timestamps.
pub mod iso_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_instant, ISO_SECONDS};

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_instant(*instant))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, ISO_SECONDS)
            .map(|dt| dt.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn hull(&self, other: &Interval) -> Interval {
        Interval::new(self.start.min(other.start), self.end.max(other.end))
    }

}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", format_instant(self.start), format_instant(self.end))
    }
}

/// Renderer settings carried through the core untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderHints {
    pub clock_multiplier: f64,
    pub interpolation_algorithm: String,
    pub interpolation_degree: u32,
    pub reference_frame: String,
    pub model_url: Option<String>,
    pub model_scale: f64,
    pub model_minimum_pixel_size: u32,
    pub lead_time_s: f64,
    pub trail_time_s: f64,
    pub path_resolution_s: f64,
    pub label_font: String,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            clock_multiplier: 60.0,
            interpolation_algorithm: "LAGRANGE".into(),
            interpolation_degree: 5,
            reference_frame: "FIXED".into(),
            model_url: None,
            model_scale: 500.0,
            model_minimum_pixel_size: 64,
            lead_time_s: 3600.0,
            trail_time_s: 3600.0,
            path_resolution_s: 120.0,
            label_font: "12pt Roboto".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    pub interval: Interval,
    pub current_time: DateTime<Utc>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationEntry {
    pub id: String,
    pub name: String,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub instant: DateTime<Utc>,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    pub object_id: String,
    pub name: String,
    pub color: Rgba,
    pub availability: Interval,
    pub points: Vec<TrackPoint>,
}

/// Station-to-object segments for every visible instant of one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LineOfSightEntry {
    pub station_id: String,
    pub object_id: String,
    pub name: String,
    pub color: Rgba,
    pub availability: Interval,
    pub instants: Vec<DateTime<Utc>>,
    /// `[station lon, station lat, 0, sat lon, sat lat, sat alt m]` per instant.
    pub positions: Vec<f64>,
}

impl LineOfSightEntry {
    pub fn segments(&self) -> impl Iterator<Item = (DateTime<Utc>, &[f64])> {
        self.instants.iter().copied().zip(self.positions.chunks(6))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDocument {
    pub name: String,
    pub clock: Clock,
    /// Hull of every entity's availability.
    pub availability: Option<Interval>,
    pub stations: Vec<StationEntry>,
    pub tracks: Vec<TrackEntry>,
    pub lines_of_sight: Vec<LineOfSightEntry>,
    pub hints: RenderHints,
}
