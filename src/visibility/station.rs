use crate::propagate::frames::geodetic_to_ecef;
use crate::timeline::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub struct GroundStation {
    pub id: String,
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub color: Rgba,
}

impl GroundStation {
    pub fn new(id: &str, name: &str, latitude_deg: f64, longitude_deg: f64, color: Rgba) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m: 0.0,
            color,
        }
    }

    /// Parse `"lat, lon"` in decimal degrees.
    pub fn from_coordinates(id: &str, name: &str, coordinates: &str, color: Rgba) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(id, name, lat, lon, color))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        geodetic_to_ecef(
            self.latitude_deg,
            self.longitude_deg,
            self.altitude_m / 1000.0,
        )
    }
}
