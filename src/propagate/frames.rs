use chrono::{DateTime, Utc};

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

/// Greenwich mean sidereal time in radians.
pub fn gmst(instant: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn geodetic_to_ecef(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> [f64; 3] {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    [
        (n + altitude_km) * cos_lat * lon.cos(),
        (n + altitude_km) * cos_lat * lon.sin(),
        (n * (1.0 - WGS84_E2) + altitude_km) * sin_lat,
    ]
}

/// Earth-fixed position to (latitude deg, longitude deg, altitude km) on WGS-84.
pub fn ecef_to_geodetic(ecef_km: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = ecef_km;
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    if p < 1e-9 {
        // On the polar axis
        let lat = if z >= 0.0 { 90.0 } else { -90.0 };
        let b = WGS84_A_KM * (1.0 - WGS84_E2).sqrt();
        return (lat, 0.0, z.abs() - b);
    }

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut n = WGS84_A_KM;
    for _ in 0..10 {
        let sin_lat = lat.sin();
        n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let next = (z + n * WGS84_E2 * sin_lat).atan2(p);
        let converged = (next - lat).abs() < 1e-12;
        lat = next;
        if converged {
            break;
        }
    }

    let alt = if lat.cos().abs() > 1e-10 {
        p / lat.cos() - n
    } else {
        z.abs() - n * (1.0 - WGS84_E2)
    };

    (lat.to_degrees(), normalize_longitude(lon.to_degrees()), alt)
}

/// Wrap into (-180, 180].
pub fn normalize_longitude(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geodetic_round_trip_at_altitude() {
        for &(lat, lon, alt) in &[
            (45.8397, -119.7006, 0.0),
            (-33.8688, 151.2093, 550.0),
            (0.0, 0.0, 35786.0),
        ] {
            let ecef = geodetic_to_ecef(lat, lon, alt);
            let (lat2, lon2, alt2) = ecef_to_geodetic(ecef);
            assert!((lat - lat2).abs() < 1e-8, "lat {} vs {}", lat, lat2);
            assert!((lon - lon2).abs() < 1e-8, "lon {} vs {}", lon, lon2);
            assert!((alt - alt2).abs() < 1e-6, "alt {} vs {}", alt, alt2);
        }
    }

    #[test]
    fn zero_sidereal_angle_is_identity() {
        assert_eq!(teme_to_ecef_position([1.0, 2.0, 3.0], 0.0), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn longitude_wraps() {
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert_eq!(normalize_longitude(45.0), 45.0);
    }
}
