//! Great-circle distance and interpolation.

use crate::models::GeoPoint;

/// WGS84 mean Earth radius (6371.0088 km) in miles
pub const WGS84_MEAN_RADIUS_MILES: f64 = 3958.7613;

pub const METERS_PER_MILE: f64 = 1609.344;

/// Haversine distance between two points, in units of `radius`
#[inline]
pub fn haversine(a: &GeoPoint, b: &GeoPoint, radius: f64) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    // Rounding can push h just past 1 for near-antipodal points
    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    radius * c
}

/// Haversine distance in miles over the WGS84 mean radius
#[inline]
pub fn haversine_miles(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine(a, b, WGS84_MEAN_RADIUS_MILES)
}

/// Point at fraction `t` along the straight lat/lng line from `a` to `b`
#[inline]
pub fn interpolate(a: &GeoPoint, b: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lng + (b.lng - a.lng) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_distance() {
        // Denver to Kansas City is roughly 558 miles as the crow flies
        let denver = GeoPoint::new(39.7392, -104.9903);
        let kansas_city = GeoPoint::new(39.0997, -94.5786);
        let d = haversine_miles(&denver, &kansas_city);
        assert!((d - 558.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let expected = WGS84_MEAN_RADIUS_MILES * std::f64::consts::PI / 180.0;
        assert!((haversine_miles(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_and_symmetric() {
        let a = GeoPoint::new(38.5, -103.0);
        let b = GeoPoint::new(38.5, -101.0);
        assert_eq!(haversine_miles(&a, &a), 0.0);
        assert_eq!(haversine_miles(&a, &b), haversine_miles(&b, &a));
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let half_circumference = WGS84_MEAN_RADIUS_MILES * std::f64::consts::PI;
        let d = haversine_miles(
            &GeoPoint::new(-87.843, -178.7673),
            &GeoPoint::new(87.843, 1.2327),
        );
        assert!((d - half_circumference).abs() < 1e-3, "got {}", d);

        for i in 0..2000 {
            let lat = -89.0 + 178.0 * (i as f64) / 2000.0;
            let lng = -179.9 + 0.17 * (i as f64);
            let a = GeoPoint::new(lat, lng);
            let b = GeoPoint::new(-lat, lng + 180.0);
            let d = haversine_miles(&a, &b);
            assert!(d.is_finite() && d <= half_circumference + 1e-6, "{:?} -> {}", a, d);
        }
    }

    #[test]
    fn test_interpolate() {
        let a = GeoPoint::new(38.0, -104.0);
        let b = GeoPoint::new(40.0, -100.0);
        assert_eq!(interpolate(&a, &b, 0.0), a);
        assert_eq!(interpolate(&a, &b, 1.0), b);
        assert_eq!(interpolate(&a, &b, 0.5), GeoPoint::new(39.0, -102.0));
    }
}
