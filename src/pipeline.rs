use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use thiserror::Error;

use crate::elements::ElementCatalog;
use crate::grid::TimeGrid;
use crate::propagate::{GeodeticProjector, GroundTrack, Propagator};
use crate::timeline::{Palette, RenderHints, TimelineAssembler, TimelineDocument};
use crate::visibility::{
    aggregate, evaluate_pair, is_visible, GroundStation, TopocentricFrame, VisibilityEvent,
    VisibilityReport, VisibilitySample,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("duplicate station id {0}")]
    DuplicateStation(String),
}

/// Everything one run needs; read-only once built.
#[derive(Debug, Clone)]
pub struct Run {
    pub catalog: ElementCatalog,
    pub stations: Vec<GroundStation>,
    pub grid: TimeGrid,
    pub min_elevation_deg: f64,
    pub threads: usize,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tracks: BTreeMap<String, GroundTrack>,
    pub report: VisibilityReport,
}

impl Run {
    fn pool(&self) -> Result<rayon::ThreadPool, PipelineError> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.max(1))
            .build()?)
    }

    fn station_ids(&self) -> Result<Vec<String>, PipelineError> {
        let mut seen = HashSet::new();
        self.stations
            .iter()
            .map(|s| {
                if seen.insert(s.id.as_str()) {
                    Ok(s.id.clone())
                } else {
                    Err(PipelineError::DuplicateStation(s.id.clone()))
                }
            })
            .collect()
    }

    fn object_ids(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }

    fn project_all<P: Propagator>(&self, propagator: &P) -> BTreeMap<String, GroundTrack> {
        let projector = GeodeticProjector::new(propagator);
        let sets: Vec<_> = self.catalog.values().collect();
        sets.par_iter()
            .map(|set| (set.id.clone(), projector.ground_track(set, &self.grid)))
            .collect()
    }

    fn evaluate_all(
        &self,
        tracks: &BTreeMap<String, GroundTrack>,
        station_ids: &[String],
    ) -> VisibilityReport {
        let frames: Vec<_> = self
            .stations
            .iter()
            .map(|s| (s, TopocentricFrame::new(s)))
            .collect();
        let pairs: Vec<_> = frames
            .iter()
            .flat_map(|(station, frame)| tracks.values().map(move |t| (*station, frame, t)))
            .collect();

        let samples: Vec<VisibilitySample> = pairs
            .par_iter()
            .flat_map_iter(|(station, frame, track)| {
                evaluate_pair(frame, station, track, self.min_elevation_deg)
            })
            .collect();
        log::debug!("Evaluated {} samples over {} pairs", samples.len(), pairs.len());

        aggregate(
            samples,
            station_ids,
            &self.object_ids(),
            self.grid.window(),
            self.grid.step(),
        )
    }

    /// Ground tracks only, one per catalog object.
    pub fn ground_tracks<P: Propagator>(
        &self,
        propagator: &P,
    ) -> Result<BTreeMap<String, GroundTrack>, PipelineError> {
        let pool = self.pool()?;
        Ok(pool.install(|| self.project_all(propagator)))
    }

    /// Rebuild a report from previously persisted events.
    ///
    /// Events not above this run's elevation threshold are dropped with a
    /// warning.
    pub fn report_from_events(
        &self,
        events: impl IntoIterator<Item = VisibilityEvent>,
    ) -> Result<VisibilityReport, PipelineError> {
        let station_ids = self.station_ids()?;
        let (kept, dropped): (Vec<_>, Vec<_>) = events
            .into_iter()
            .partition(|e| is_visible(e.elevation_deg, self.min_elevation_deg));
        if let Some(first) = dropped.first() {
            log::warn!(
                "Dropped {} persisted events not above {}° (first: {} -> {} at {:.2}°)",
                dropped.len(),
                self.min_elevation_deg,
                first.station_id,
                first.object_id,
                first.elevation_deg
            );
        }

        Ok(VisibilityReport::from_events(
            kept,
            &station_ids,
            &self.object_ids(),
            self.grid.window(),
            self.grid.step(),
        ))
    }

    pub fn execute<P: Propagator>(&self, propagator: &P) -> Result<RunOutput, PipelineError> {
        log::info!(
            "Running {} objects against {} stations over {} samples ({} threads)",
            self.catalog.len(),
            self.stations.len(),
            self.grid.len(),
            self.threads
        );
        let station_ids = self.station_ids()?;
        let pool = self.pool()?;
        let (tracks, report) = pool.install(|| {
            let tracks = self.project_all(propagator);
            let report = self.evaluate_all(&tracks, &station_ids);
            (tracks, report)
        });
        log::info!("Found {} visibility events", report.event_count());

        Ok(RunOutput { tracks, report })
    }
}

impl RunOutput {
    pub fn timeline(
        &self,
        run: &Run,
        name: &str,
        hints: RenderHints,
        palette: &Palette,
    ) -> TimelineDocument {
        TimelineAssembler::new(name, run.grid.window(), hints).assemble(
            &run.stations,
            &self.tracks,
            &self.report,
            &palette.styles(&run.catalog),
        )
    }
}
