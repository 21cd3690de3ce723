//! Containment and boundary distance for zone shapes
//!
//! Circles use Haversine distance to the center (boundary inclusive).
//! Polygons use a ray-casting parity test in raw longitude/latitude space;
//! winding order does not matter and self-intersecting polygons give
//! whatever parity the crossings add up to.
//!
//! Neither test corrects for the antimeridian: a polygon spanning ±180°
//! longitude is interpreted as wrapping the long way around.

use crate::error::GeofenceError;
use crate::fixes::Coordinate;
use crate::zones::Shape;

use super::distance::{haversine_distance, point_to_segment_distance};

/// Is `point` inside `shape`?
pub fn contains_point(point: Coordinate, shape: &Shape) -> Result<bool, GeofenceError> {
    shape.validate()?;

    let inside = match shape {
        Shape::Circle {
            center,
            radius_meters,
        } => haversine_distance(point, *center) <= *radius_meters,
        Shape::Polygon { vertices } => ray_cast(point, vertices),
    };

    Ok(inside)
}

/// Shortest distance in meters from `point` to the edge of `shape`
///
/// The result is unsigned: a point 100m inside a circle and a point 100m
/// outside both report 100.
pub fn distance_to_boundary(point: Coordinate, shape: &Shape) -> Result<f64, GeofenceError> {
    shape.validate()?;

    let distance = match shape {
        Shape::Circle {
            center,
            radius_meters,
        } => (haversine_distance(point, *center) - radius_meters).abs(),
        Shape::Polygon { vertices } => edges(vertices)
            .map(|(start, end)| point_to_segment_distance(point, start, end))
            .fold(f64::INFINITY, f64::min),
    };

    Ok(distance)
}

/// Consecutive vertex pairs, including the closing edge back to the first vertex
fn edges(vertices: &[Coordinate]) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
    vertices
        .iter()
        .copied()
        .zip(vertices.iter().copied().cycle().skip(1))
}

fn ray_cast(point: Coordinate, vertices: &[Coordinate]) -> bool {
    let x = point.longitude;
    let y = point.latitude;

    let mut inside = false;
    for (a, b) in edges(vertices) {
        let (xi, yi) = (a.longitude, a.latitude);
        let (xj, yj) = (b.longitude, b.latitude);

        // Only edges straddling the horizontal line through the point count;
        // this also keeps yj - yi away from zero below.
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
    }
    inside
}
