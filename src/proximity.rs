use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::elements::OrbitalElementSet;
use crate::grid::TimeGrid;
use crate::propagate::{GeodeticProjector, Propagator, Subpoint};
use crate::timeline::format_instant;

/// Mean Earth radius (IUGG), km.
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

pub const DEFAULT_THRESHOLD_KM: f64 = 300.0;

#[derive(Debug, Error)]
pub enum ProximityError {
    #[error("proximity log IO error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximitySample {
    pub instant: DateTime<Utc>,
    pub distance_km: f64,
}

/// Great-circle distance between two subpoints on a sphere of
/// [`MEAN_EARTH_RADIUS_KM`].
///
/// This is not the WGS-84 geodesic: against the ellipsoidal distance the
/// error is up to about 0.5%, e.g. a quarter meridian comes out near
/// 10007.5 km instead of 10002.0 km. Thresholds close to a distance of
/// interest should allow for that.
pub fn haversine_km(a: &Subpoint, b: &Subpoint) -> f64 {
    let (lat1, lat2) = (a.latitude_deg.to_radians(), b.latitude_deg.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude_deg - a.longitude_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Surface distance between the subpoints of `a` and `b` at every grid instant.
///
/// Instants where either object fails to propagate are left out.
pub fn distance_series<P: Propagator>(
    projector: &GeodeticProjector<'_, P>,
    a: &OrbitalElementSet,
    b: &OrbitalElementSet,
    grid: &TimeGrid,
) -> Vec<ProximitySample> {
    grid.instants()
        .into_iter()
        .filter_map(|instant| {
            match (projector.project(a, instant), projector.project(b, instant)) {
                (Ok(sa), Ok(sb)) => Some(ProximitySample {
                    instant,
                    distance_km: haversine_km(&sa.subpoint, &sb.subpoint),
                }),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("{}", e);
                    None
                }
            }
        })
        .collect()
}

pub fn close_approaches(series: &[ProximitySample], threshold_km: f64) -> Vec<ProximitySample> {
    series
        .iter()
        .filter(|s| s.distance_km < threshold_km)
        .copied()
        .collect()
}

/// Interior samples no farther than either neighbour.
pub fn local_minima(series: &[ProximitySample]) -> Vec<ProximitySample> {
    series
        .windows(3)
        .filter(|w| w[1].distance_km <= w[0].distance_km && w[1].distance_km <= w[2].distance_km)
        .map(|w| w[1])
        .collect()
}

pub fn write_log(path: &Path, samples: &[ProximitySample]) -> Result<(), ProximityError> {
    let io_err = |source| ProximityError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "Time,Distance_km").map_err(io_err)?;
    for sample in samples {
        writeln!(
            writer,
            "{},{:.2}",
            format_instant(sample.instant),
            sample.distance_km
        )
        .map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(minute: i64, distance_km: f64) -> ProximitySample {
        ProximitySample {
            instant: Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap() + Duration::minutes(minute),
            distance_km,
        }
    }

    fn subpoint(latitude_deg: f64, longitude_deg: f64) -> Subpoint {
        Subpoint {
            latitude_deg,
            longitude_deg,
            altitude_km: 400.0,
        }
    }

    #[test]
    fn haversine_quarter_meridian() {
        let d = haversine_km(&subpoint(0.0, 0.0), &subpoint(90.0, 0.0));
        assert!((d - MEAN_EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(haversine_km(&subpoint(12.0, 34.0), &subpoint(12.0, 34.0)), 0.0);
    }

    #[test]
    fn haversine_uses_spherical_radius() {
        let meridian_quadrant_wgs84_km = 10_001.966;
        let d = haversine_km(&subpoint(0.0, 0.0), &subpoint(90.0, 0.0));
        let relative = (d - meridian_quadrant_wgs84_km) / meridian_quadrant_wgs84_km;
        assert!(relative > 0.0 && relative < 0.005, "{}", relative);

        let equator = haversine_km(&subpoint(0.0, 0.0), &subpoint(0.0, 1.0));
        assert!((equator - 111.195).abs() < 1e-3, "{}", equator);
    }

    #[test]
    fn haversine_across_antimeridian() {
        let d = haversine_km(&subpoint(0.0, 179.5), &subpoint(0.0, -179.5));
        assert!((d - MEAN_EARTH_RADIUS_KM * 1f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn filters_and_minima() {
        let series = vec![
            sample(0, 500.0),
            sample(1, 250.0),
            sample(2, 120.0),
            sample(3, 180.0),
            sample(4, 400.0),
            sample(5, 350.0),
        ];

        let close = close_approaches(&series, DEFAULT_THRESHOLD_KM);
        assert_eq!(close.len(), 3);

        let minima = local_minima(&series);
        assert_eq!(minima, vec![sample(2, 120.0)]);
    }

    #[test]
    fn log_has_header_and_rounded_distances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proximity_log.csv");
        write_log(&path, &[sample(0, 12.3456), sample(1, 7.0)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Time,Distance_km\n2024-05-07T00:00:00Z,12.35\n2024-05-07T00:01:00Z,7.00\n"
        );
    }
}
