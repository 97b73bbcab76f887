use std::collections::BTreeMap;
use std::io::{self, Write};

use chrono::{DateTime, Duration, Utc};

use crate::timeline::Interval;
use crate::visibility::evaluator::VisibilitySample;
use crate::visibility::station::GroundStation;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub station_id: String,
    pub object_id: String,
}

impl PairKey {
    pub fn new(station_id: &str, object_id: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            object_id: object_id.to_string(),
        }
    }
}

/// A sampled instant at which the object was above the elevation threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEvent {
    pub station_id: String,
    pub object_id: String,
    pub instant: DateTime<Utc>,
    pub elevation_deg: f64,
}

/// Every visible sample of one (station, object) pair, in instant order.
///
/// Adjacent samples are never merged: each event stands for exactly one
/// sampling step of visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityWindow {
    pub key: PairKey,
    pub step: Duration,
    pub events: Vec<VisibilityEvent>,
}

impl VisibilityWindow {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_visible(&self) -> Duration {
        self.step * self.events.len() as i32
    }

    pub fn total_visible_minutes(&self) -> f64 {
        self.events.len() as f64 * self.step.num_microseconds().unwrap_or(i64::MAX) as f64
            / 60_000_000.0
    }

    pub fn interval(&self) -> Option<Interval> {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => Some(Interval::new(first.instant, last.instant)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityReport {
    pub window: Interval,
    pub step: Duration,
    pub station_ids: Vec<String>,
    pub windows: BTreeMap<PairKey, VisibilityWindow>,
}

/// Group per-instant samples by (station, object), keeping only visible ones.
///
/// Every listed pair gets a window, even when it has no events.
pub fn aggregate(
    samples: impl IntoIterator<Item = VisibilitySample>,
    station_ids: &[String],
    object_ids: &[String],
    window: Interval,
    step: Duration,
) -> VisibilityReport {
    let events = samples
        .into_iter()
        .filter(|s| s.visible)
        .map(|s| VisibilityEvent {
            station_id: s.station_id,
            object_id: s.object_id,
            instant: s.instant,
            elevation_deg: s.elevation_deg,
        });
    VisibilityReport::from_events(events, station_ids, object_ids, window, step)
}

impl VisibilityReport {
    pub fn from_events(
        events: impl IntoIterator<Item = VisibilityEvent>,
        station_ids: &[String],
        object_ids: &[String],
        window: Interval,
        step: Duration,
    ) -> Self {
        let mut windows: BTreeMap<PairKey, VisibilityWindow> = BTreeMap::new();
        for station_id in station_ids {
            for object_id in object_ids {
                let key = PairKey::new(station_id, object_id);
                windows.insert(
                    key.clone(),
                    VisibilityWindow {
                        key,
                        step,
                        events: Vec::new(),
                    },
                );
            }
        }

        for event in events {
            let key = PairKey::new(&event.station_id, &event.object_id);
            windows
                .entry(key.clone())
                .or_insert_with(|| VisibilityWindow {
                    key,
                    step,
                    events: Vec::new(),
                })
                .events
                .push(event);
        }

        for w in windows.values_mut() {
            w.events.sort_by_key(|e| e.instant);
        }

        let mut station_ids = station_ids.to_vec();
        for key in windows.keys() {
            if !station_ids.contains(&key.station_id) {
                station_ids.push(key.station_id.clone());
            }
        }

        Self {
            window,
            step,
            station_ids,
            windows,
        }
    }

    pub fn window_for(&self, station_id: &str, object_id: &str) -> Option<&VisibilityWindow> {
        self.windows.get(&PairKey::new(station_id, object_id))
    }

    /// Windows with at least one event, in (station, object) order.
    pub fn non_empty(&self) -> impl Iterator<Item = &VisibilityWindow> {
        self.windows.values().filter(|w| !w.is_empty())
    }

    pub fn station_windows<'a>(
        &'a self,
        station_id: &'a str,
    ) -> impl Iterator<Item = &'a VisibilityWindow> + 'a {
        self.windows
            .values()
            .filter(move |w| w.key.station_id == station_id)
    }

    pub fn station_total_minutes(&self, station_id: &str) -> f64 {
        self.station_windows(station_id)
            .map(|w| w.total_visible_minutes())
            .sum()
    }

    pub fn average_minutes_per_hour(&self, station_id: &str) -> f64 {
        let hours = self.window.duration().num_milliseconds() as f64 / 3_600_000.0;
        if hours <= 0.0 {
            return 0.0;
        }
        self.station_total_minutes(station_id) / hours
    }

    pub fn event_count(&self) -> usize {
        self.windows.values().map(|w| w.events.len()).sum()
    }

    pub fn print_report<W: Write>(&self, stations: &[GroundStation], out: &mut W) -> io::Result<()> {
        writeln!(out, "Visibility Report")?;
        writeln!(out, "=================")?;

        for station_id in &self.station_ids {
            let name = stations
                .iter()
                .find(|s| &s.id == station_id)
                .map(|s| s.name.as_str())
                .unwrap_or(station_id);
            writeln!(out)?;
            writeln!(out, "Ground Station: {}", name)?;

            for w in self.station_windows(station_id).filter(|w| !w.is_empty()) {
                writeln!(out)?;
                writeln!(out, "  Satellite {}:", w.key.object_id)?;
                for event in &w.events {
                    writeln!(
                        out,
                        "    Time: {}, Elevation: {:.1}°",
                        event.instant.format("%Y-%m-%dT%H:%M:%SZ"),
                        event.elevation_deg
                    )?;
                }
                writeln!(
                    out,
                    "    Total visible time: {} minutes",
                    w.total_visible_minutes()
                )?;
            }

            writeln!(out)?;
            writeln!(
                out,
                "  Total visibility time for all satellites: {} minutes",
                self.station_total_minutes(station_id)
            )?;
            writeln!(
                out,
                "  Average visibility: {:.1} minutes/hour",
                self.average_minutes_per_hour(station_id)
            )?;
        }

        Ok(())
    }
}
