//! Geospatial helpers under the flat equirectangular approximation used
//! throughout (`1° ≈ 111 000 m` — spec.md §1 Non-goals: accurate geodesy is
//! out of scope).

/// Metres per degree of latitude/longitude under the flat approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Convert a distance in metres to the equivalent in degrees.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Euclidean distance in degrees between two `(lat, lon)` points.
pub fn distance_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = a.0 - b.0;
    let dlon = a.1 - b.1;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Mock coordinates near LAX, matching the upstream geo stub's demo center.
pub const MOCK_CENTER: (f64, f64) = (33.9425, -118.4081);

/// Jittered stand-in for the pixel-to-latlon projection (spec.md §1: the
/// real projection is an opaque external collaborator). Used by the CLI
/// ingestion path when a `Detection` arrives without `geo_location`.
pub fn mock_geo_location() -> (f64, f64) {
    use rand::Rng;
    let mut rng = rand::rng();
    let lat = MOCK_CENTER.0 + rng.random_range(-0.01..0.01);
    let lon = MOCK_CENTER.1 + rng.random_range(-0.01..0.01);
    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_meters_roundtrip() {
        let deg = meters_to_degrees(100.0);
        assert!((deg - 100.0 / 111_000.0).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = (33.94, -118.40);
        let b = (33.95, -118.41);
        assert_eq!(distance_deg(a, b), distance_deg(b, a));
    }

    #[test]
    fn mock_geo_location_stays_near_center() {
        for _ in 0..20 {
            let (lat, lon) = mock_geo_location();
            assert!((lat - MOCK_CENTER.0).abs() <= 0.01);
            assert!((lon - MOCK_CENTER.1).abs() <= 0.01);
        }
    }
}
