use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sat_o_vis::config::{parse_duration, Config};
use sat_o_vis::elements::{ElementCatalog, ElementsLoader, OrbitalElementSet};
use sat_o_vis::grid::TimeGrid;
use sat_o_vis::pipeline::{Run, RunOutput};
use sat_o_vis::propagate::{GeodeticProjector, Sgp4Propagator};
use sat_o_vis::proximity::{self, DEFAULT_THRESHOLD_KM};
use sat_o_vis::render::{self, OutputFormat};
use sat_o_vis::visibility::VisibilitySummary;
use sat_o_vis::{Error, Result};

#[derive(Parser)]
#[command(name = "sat-o-vis")]
#[command(about = "Satellite ground tracks and ground station visibility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an element set file
    Validate { elements: PathBuf },
    /// Compute visibility windows and persist the summary
    Visibility {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        elements: PathBuf,
        #[arg(long, default_value = "visibility_data.json")]
        out: PathBuf,
    },
    /// Render ground tracks and lines of sight as CZML or KML
    Timeline {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        elements: PathBuf,
        /// Defaults to `timeline.czml` or `timeline.kml`
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Czml)]
        format: OutputFormat,
        /// Reuse a persisted visibility summary instead of recomputing
        #[arg(long)]
        visibility: Option<PathBuf>,
    },
    /// Log close approaches between two objects
    Proximity {
        #[arg(long)]
        elements: PathBuf,
        a: String,
        b: String,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long, default_value = "6h", value_parser = parse_duration)]
        span: Duration,
        #[arg(long, default_value = "1m", value_parser = parse_duration)]
        step: Duration,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_KM)]
        threshold_km: f64,
        #[arg(long, default_value = "proximity_log.csv")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { elements } => validate(&elements),
        Commands::Visibility {
            config,
            elements,
            out,
        } => visibility(&config, &elements, &out),
        Commands::Timeline {
            config,
            elements,
            out,
            format,
            visibility,
        } => {
            let out = out.unwrap_or_else(|| default_timeline_path(format));
            timeline(&config, &elements, &out, format, visibility.as_deref())
        }
        Commands::Proximity {
            elements,
            a,
            b,
            start,
            span,
            step,
            threshold_km,
            out,
        } => proximity_report(&elements, &a, &b, start, span, step, threshold_km, &out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path) -> Result<()> {
    let catalog = ElementsLoader::load(path)?;
    println!("Element file is valid ({} objects)", catalog.len());
    for set in catalog.values() {
        println!(
            "  {}: {} @ {} (incl {:.4}°, {:.8} rev/day)",
            set.id,
            set.name.as_deref().unwrap_or("-"),
            set.epoch.format("%Y-%m-%dT%H:%M:%SZ"),
            set.inclination_deg,
            set.mean_motion_rev_per_day
        );
    }
    Ok(())
}

fn prepare(config_path: &Path, elements_path: &Path) -> Result<(Config, Run)> {
    let config = Config::from_file(config_path)?;
    let catalog = ElementsLoader::load(elements_path)?;
    let run = Run {
        stations: config.stations()?,
        grid: config.grid()?,
        min_elevation_deg: config.min_elevation_deg,
        threads: config.threads,
        catalog,
    };
    Ok((config, run))
}

fn visibility(config_path: &Path, elements_path: &Path, out: &Path) -> Result<()> {
    let (_, run) = prepare(config_path, elements_path)?;
    let propagator = Sgp4Propagator::new(&run.catalog);
    let output = run.execute(&propagator)?;

    output.report.print_report(&run.stations, &mut io::stdout().lock())?;
    VisibilitySummary::from_report(&output.report).save(out)?;
    log::info!("Visibility summary written to {}", out.display());
    Ok(())
}

fn default_timeline_path(format: OutputFormat) -> PathBuf {
    PathBuf::from(format!("timeline.{}", format.extension()))
}

fn timeline(
    config_path: &Path,
    elements_path: &Path,
    out: &Path,
    format: OutputFormat,
    summary: Option<&Path>,
) -> Result<()> {
    let (config, run) = prepare(config_path, elements_path)?;
    let propagator = Sgp4Propagator::new(&run.catalog);

    let output = match summary {
        Some(path) => {
            let summary = VisibilitySummary::load(path)?;
            log::info!("Using persisted visibility from {}", path.display());
            RunOutput {
                tracks: run.ground_tracks(&propagator)?,
                report: run.report_from_events(summary.events())?,
            }
        }
        None => run.execute(&propagator)?,
    };

    let doc = output.timeline(
        &run,
        &config.render.name,
        config.render.hints.clone(),
        &config.render.palette,
    );
    let bytes = render::render(&doc, format)?;
    render::write_document(out, &bytes)?;
    println!("Wrote {} timeline to {}", format, out.display());
    Ok(())
}

fn find<'a>(catalog: &'a ElementCatalog, id: &str) -> Result<&'a OrbitalElementSet> {
    catalog
        .get(id)
        .ok_or_else(|| Error::UnknownObject(id.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn proximity_report(
    elements_path: &Path,
    a: &str,
    b: &str,
    start: DateTime<Utc>,
    span: Duration,
    step: Duration,
    threshold_km: f64,
    out: &Path,
) -> Result<()> {
    let catalog = ElementsLoader::load(elements_path)?;
    let (set_a, set_b) = (find(&catalog, a)?, find(&catalog, b)?);
    let grid = TimeGrid::new(start, span, step)?;

    let propagator = Sgp4Propagator::new(&catalog);
    let projector = GeodeticProjector::new(&propagator);
    let series = proximity::distance_series(&projector, set_a, set_b, &grid);
    let close = proximity::close_approaches(&series, threshold_km);

    for sample in &close {
        println!(
            "[PROXIMITY] {},{:.2}",
            sample.instant.format("%Y-%m-%dT%H:%M:%SZ"),
            sample.distance_km
        );
    }
    if let Some(closest) = series
        .iter()
        .min_by(|x, y| x.distance_km.total_cmp(&y.distance_km))
    {
        println!(
            "Closest approach: {:.2} km at {}",
            closest.distance_km,
            closest.instant.format("%Y-%m-%dT%H:%M:%SZ")
        );
    }
    log::info!(
        "{} of {} samples within {} km, {} local minima",
        close.len(),
        series.len(),
        threshold_km,
        proximity::local_minima(&series).len()
    );

    proximity::write_log(out, &close)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_output_defaults_follow_format() {
        assert_eq!(default_timeline_path(OutputFormat::Czml), PathBuf::from("timeline.czml"));
        assert_eq!(default_timeline_path(OutputFormat::Kml), PathBuf::from("timeline.kml"));

        let cli = Cli::try_parse_from([
            "sat-o-vis", "timeline", "--config", "c.yaml", "--elements", "e.tle", "--format", "kml",
        ])
        .unwrap();
        match cli.command {
            Commands::Timeline { out, format, .. } => {
                assert_eq!(out, None);
                assert_eq!(format, OutputFormat::Kml);
            }
            _ => panic!("expected timeline command"),
        }
    }
}
