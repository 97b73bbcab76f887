use std::collections::BTreeMap;

use crate::propagate::GroundTrack;
use crate::timeline::style::{Rgba, TrackStyle};
use crate::timeline::types::{
    Clock, Interval, LineOfSightEntry, RenderHints, StationEntry, TimelineDocument, TrackEntry,
    TrackPoint,
};
use crate::visibility::{GroundStation, VisibilityReport};

const KM_TO_M: f64 = 1000.0;

pub struct TimelineAssembler {
    name: String,
    window: Interval,
    hints: RenderHints,
}

impl TimelineAssembler {
    pub fn new(name: &str, window: Interval, hints: RenderHints) -> Self {
        Self {
            name: name.to_string(),
            window,
            hints,
        }
    }

    pub fn assemble(
        &self,
        stations: &[GroundStation],
        tracks: &BTreeMap<String, GroundTrack>,
        report: &VisibilityReport,
        styles: &BTreeMap<String, TrackStyle>,
    ) -> TimelineDocument {
        let station_entries: Vec<StationEntry> = stations
            .iter()
            .map(|s| StationEntry {
                id: s.id.clone(),
                name: s.name.clone(),
                longitude_deg: s.longitude_deg,
                latitude_deg: s.latitude_deg,
                color: s.color,
            })
            .collect();

        let track_entries: Vec<TrackEntry> = tracks
            .values()
            .filter_map(|track| track_entry(track, styles))
            .collect();

        let lines_of_sight: Vec<LineOfSightEntry> = report
            .non_empty()
            .filter_map(|window| {
                let station = stations.iter().find(|s| s.id == window.key.station_id);
                let track = tracks.get(&window.key.object_id);
                match (station, track) {
                    (Some(station), Some(track)) => {
                        line_of_sight_entry(station, track, &window.events)
                    }
                    _ => {
                        log::warn!(
                            "No station or track for line of sight {}/{}",
                            window.key.station_id,
                            window.key.object_id
                        );
                        None
                    }
                }
            })
            .collect();

        let availability = track_entries
            .iter()
            .map(|t| t.availability)
            .chain(lines_of_sight.iter().map(|l| l.availability))
            .reduce(|a, b| a.hull(&b));

        log::info!(
            "Assembled timeline: {} stations, {} tracks, {} lines of sight",
            station_entries.len(),
            track_entries.len(),
            lines_of_sight.len()
        );

        TimelineDocument {
            name: self.name.clone(),
            clock: Clock {
                interval: self.window,
                current_time: self.window.start,
                multiplier: self.hints.clock_multiplier,
            },
            availability,
            stations: station_entries,
            tracks: track_entries,
            lines_of_sight,
            hints: self.hints.clone(),
        }
    }
}

fn track_entry(track: &GroundTrack, styles: &BTreeMap<String, TrackStyle>) -> Option<TrackEntry> {
    let (first, last) = match (track.states.first(), track.states.last()) {
        (Some(first), Some(last)) => (first.instant, last.instant),
        _ => {
            log::warn!("No samples for {}, leaving it out of the timeline", track.object_id);
            return None;
        }
    };

    let (name, color) = styles
        .get(&track.object_id)
        .map(|s| (s.name.clone(), s.color))
        .unwrap_or_else(|| (format!("Satellite {}", track.object_id), Rgba::WHITE));

    Some(TrackEntry {
        object_id: track.object_id.clone(),
        name,
        color,
        availability: Interval::new(first, last),
        points: track
            .states
            .iter()
            .map(|s| TrackPoint {
                instant: s.instant,
                longitude_deg: s.subpoint.longitude_deg,
                latitude_deg: s.subpoint.latitude_deg,
                altitude_m: s.subpoint.altitude_km * KM_TO_M,
            })
            .collect(),
    })
}

fn line_of_sight_entry(
    station: &GroundStation,
    track: &GroundTrack,
    events: &[crate::visibility::VisibilityEvent],
) -> Option<LineOfSightEntry> {
    let mut instants = Vec::with_capacity(events.len());
    let mut positions = Vec::with_capacity(events.len() * 6);

    for event in events {
        let Some(state) = track.state_at(event.instant) else {
            log::warn!(
                "No position for {} at {}, dropping line of sight sample",
                event.object_id,
                event.instant
            );
            continue;
        };
        instants.push(event.instant);
        positions.extend_from_slice(&[
            station.longitude_deg,
            station.latitude_deg,
            0.0,
            state.subpoint.longitude_deg,
            state.subpoint.latitude_deg,
            state.subpoint.altitude_km * KM_TO_M,
        ]);
    }

    let availability = Interval::new(*instants.first()?, *instants.last()?);

    Some(LineOfSightEntry {
        station_id: station.id.clone(),
        object_id: track.object_id.clone(),
        name: format!(
            "Line of Sight - {} to Satellite {}",
            station.name, track.object_id
        ),
        color: station.color,
        availability,
        instants,
        positions,
    })
}
