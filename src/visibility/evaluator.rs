use chrono::{DateTime, Utc};

use crate::propagate::GroundTrack;
use crate::visibility::station::GroundStation;

pub const DEFAULT_MIN_ELEVATION_DEG: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// One evaluated (station, object, instant) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilitySample {
    pub station_id: String,
    pub object_id: String,
    pub instant: DateTime<Utc>,
    pub elevation_deg: f64,
    pub visible: bool,
}

/// Strictly above the threshold. An object exactly at the threshold is not visible.
pub fn is_visible(elevation_deg: f64, min_elevation_deg: f64) -> bool {
    elevation_deg > min_elevation_deg
}

/// East-north-up frame at a ground station. Built once per station and reused
/// for every object and instant.
#[derive(Debug, Clone, Copy)]
pub struct TopocentricFrame {
    origin_km: [f64; 3],
    sin_lat: f64,
    cos_lat: f64,
    sin_lon: f64,
    cos_lon: f64,
}

impl TopocentricFrame {
    pub fn new(station: &GroundStation) -> Self {
        let lat = station.lat_rad();
        let lon = station.lon_rad();
        Self {
            origin_km: station.position_ecef_km(),
            sin_lat: lat.sin(),
            cos_lat: lat.cos(),
            sin_lon: lon.sin(),
            cos_lon: lon.cos(),
        }
    }

    pub fn ecef_to_enu(&self, dr: [f64; 3]) -> (f64, f64, f64) {
        let east = -self.sin_lon * dr[0] + self.cos_lon * dr[1];
        let north = -self.sin_lat * self.cos_lon * dr[0] - self.sin_lat * self.sin_lon * dr[1]
            + self.cos_lat * dr[2];
        let up = self.cos_lat * self.cos_lon * dr[0]
            + self.cos_lat * self.sin_lon * dr[1]
            + self.sin_lat * dr[2];
        (east, north, up)
    }

    pub fn look_angles(&self, target_ecef_km: [f64; 3]) -> LookAngles {
        let dr = [
            target_ecef_km[0] - self.origin_km[0],
            target_ecef_km[1] - self.origin_km[1],
            target_ecef_km[2] - self.origin_km[2],
        ];
        let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();
        let (east, north, up) = self.ecef_to_enu(dr);

        let elevation_deg = if range_km > 0.0 {
            (up / range_km).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            90.0
        };
        let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);

        LookAngles {
            azimuth_deg,
            elevation_deg,
            range_km,
        }
    }
}

/// Evaluate one (station, object) pair over the object's whole track.
pub fn evaluate_pair(
    frame: &TopocentricFrame,
    station: &GroundStation,
    track: &GroundTrack,
    min_elevation_deg: f64,
) -> Vec<VisibilitySample> {
    track
        .states
        .iter()
        .map(|state| {
            let angles = frame.look_angles(state.ecef_km);
            VisibilitySample {
                station_id: station.id.clone(),
                object_id: track.object_id.clone(),
                instant: state.instant,
                elevation_deg: angles.elevation_deg,
                visible: is_visible(angles.elevation_deg, min_elevation_deg),
            }
        })
        .collect()
}
