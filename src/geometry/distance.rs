//! Great-circle distance helpers on a spherical earth

use crate::fixes::Coordinate;

/// Mean earth radius used by every distance in the crate
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance between two points in meters using the Haversine formula
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `from` to `to`, normalized to [0, 360)
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// Distance in meters from `point` to the segment `start`-`end`
///
/// The closest point on the segment is found by projecting in a local
/// equirectangular plane centered on `point` (longitude scaled by the cosine
/// of its latitude); the distance to that closest point is then measured
/// with Haversine. Good for zone-sized segments, not for continental ones.
pub fn point_to_segment_distance(point: Coordinate, start: Coordinate, end: Coordinate) -> f64 {
    let lon_scale = point.latitude.to_radians().cos();

    let seg_x = (end.longitude - start.longitude) * lon_scale;
    let seg_y = end.latitude - start.latitude;
    let rel_x = (point.longitude - start.longitude) * lon_scale;
    let rel_y = point.latitude - start.latitude;

    let length_sq = seg_x * seg_x + seg_y * seg_y;
    let t = if length_sq > 0.0 {
        ((rel_x * seg_x + rel_y * seg_y) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let closest = Coordinate::new(
        start.latitude + t * (end.latitude - start.latitude),
        start.longitude + t * (end.longitude - start.longitude),
    );

    haversine_distance(point, closest)
}

/// Move `meters` along `bearing_degrees` from `origin`
pub fn destination_point(origin: Coordinate, bearing_degrees: f64, meters: f64) -> Coordinate {
    let angular = meters / EARTH_RADIUS_M;
    let bearing = bearing_degrees.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate::new(lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_and_symmetry() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let london = Coordinate::new(51.5074, -0.1278);

        assert_eq!(haversine_distance(paris, paris), 0.0);
        let there = haversine_distance(paris, london);
        let back = haversine_distance(london, paris);
        assert!((there - back).abs() < 1e-6);
        // Paris-London is about 344 km
        assert!((there - 343_500.0).abs() < 2_000.0, "got {}", there);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert!((initial_bearing(origin, Coordinate::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((initial_bearing(origin, Coordinate::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(origin, Coordinate::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(origin, Coordinate::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_to_segment_projects_onto_interior() {
        // Segment along the equator, point 0.01 degrees north of its middle
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.0, 0.02);
        let point = Coordinate::new(0.01, 0.01);

        let expected = haversine_distance(point, Coordinate::new(0.0, 0.01));
        let actual = point_to_segment_distance(point, start, end);
        assert!((actual - expected).abs() < 1e-6);
    }

    #[test]
    fn test_point_to_segment_clamps_to_endpoints() {
        let start = Coordinate::new(0.0, 0.0);
        let end = Coordinate::new(0.0, 0.01);
        let point = Coordinate::new(0.0, 0.02);

        let expected = haversine_distance(point, end);
        assert!((point_to_segment_distance(point, start, end) - expected).abs() < 1e-6);

        // Degenerate segment collapses to a point
        assert!((point_to_segment_distance(point, start, start) - haversine_distance(point, start)).abs() < 1e-9);
    }

    #[test]
    fn test_destination_point_round_trips_distance() {
        let origin = Coordinate::new(48.8566, 2.3522);
        let target = destination_point(origin, 45.0, 600.0);
        assert!((haversine_distance(origin, target) - 600.0).abs() < 1e-4);
        assert!((initial_bearing(origin, target) - 45.0).abs() < 0.01);
    }
}
