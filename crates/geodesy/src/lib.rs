//! Point-to-point geodesic math on the WGS-84 ellipsoid (a = 6378137 m, f = 1/298.257223563).
//!
//! Every function here is pure and stateless; the sweep kernels in the `raster` crate call
//! into this module once per row (or once per vector feature) rather than holding any
//! geodesic solver state themselves.
use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic, PolygonArea, Winding};

/// Geodesic distance in meters between two lon/lat points, using Karney's algorithm.
///
/// Always converges, including for antipodal pairs; returns a finite value at the poles.
pub fn distance_geo(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let g = Geodesic::wgs84();
    let (distance, _azi1, _azi2, _m12): (f64, f64, f64, f64) = g.inverse(lat1, lon1, lat2, lon2);
    distance
}

/// Forward azimuth in degrees (0 = north, clockwise positive) from `(lon1,lat1)` to `(lon2,lat2)`.
pub fn azimuth_geo(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let g = Geodesic::wgs84();
    let (_distance, azi1, _azi2, _m12): (f64, f64, f64, f64) = g.inverse(lat1, lon1, lat2, lon2);
    azi1
}

/// The point reached by travelling `dist_m` meters from `(lon,lat)` along `azimuth_deg`,
/// plus the back azimuth at the destination.
pub fn direct_geo(lon: f64, lat: f64, azimuth_deg: f64, dist_m: f64) -> (f64, f64, f64) {
    let g = Geodesic::wgs84();
    let (lat2, lon2, back_azimuth): (f64, f64, f64) = g.direct(lat, lon, azimuth_deg, dist_m);
    (lon2, lat2, back_azimuth)
}

/// Area in square meters of a simple ring given as parallel lon/lat slices.
///
/// Signed by traversal direction (positive for counter-clockwise winding); the caller
/// takes the absolute value for an exterior ring and subtracts hole areas for interiors.
pub fn polygon_area_geo(lons: &[f64], lats: &[f64]) -> f64 {
    assert_eq!(lons.len(), lats.len(), "lons and lats must have the same length");
    let g = Geodesic::wgs84();
    let mut pa = PolygonArea::new(&g, Winding::CounterClockwise);
    for (&lon, &lat) in lons.iter().zip(lats.iter()) {
        pa.add_point(lat, lon);
    }
    let (_perimeter, area, _count) = pa.compute(true);
    area
}

/// Planar Euclidean distance between two `(x, y)` points in the raster's native linear unit.
pub fn distance_plane((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_and_destination_round_trip() {
        let (lon, lat) = (9.177789688110352, 48.776781529534965);
        let (lon2, lat2, _back) = direct_geo(lon, lat, 45.0, 10_000.0);
        let d = distance_geo(lon, lat, lon2, lat2);
        assert_relative_eq!(d, 10_000.0, epsilon = 1.0e-6);
    }

    #[test]
    fn known_city_distance() {
        // New York City to London.
        let d = distance_geo(-74.006, 40.7128, -0.1278, 51.5074);
        assert_relative_eq!(d, 5_585_234.0, epsilon = 1.0);
    }

    #[test]
    fn antipodal_pair_is_finite() {
        let d = distance_geo(0.0, 0.0, 180.0, 0.0);
        assert!(d.is_finite());
    }

    #[test]
    fn pole_to_pole_distance_is_finite() {
        let d = distance_geo(0.0, 90.0, 0.0, -90.0);
        assert!(d.is_finite());
        assert_relative_eq!(d, 20_003_931.4586233, epsilon = 1.0);
    }

    #[test]
    fn plane_distance_is_pythagorean() {
        assert_relative_eq!(distance_plane((0.0, 0.0), (3.0, 4.0)), 5.0);
    }

    #[test]
    fn square_degree_polygon_area_is_positive_ccw() {
        // Roughly a 1x1 degree square near the equator, wound counter-clockwise.
        let lons = [0.0, 1.0, 1.0, 0.0];
        let lats = [0.0, 0.0, 1.0, 1.0];
        let area = polygon_area_geo(&lons, &lats);
        assert!(area > 0.0);
    }
}
