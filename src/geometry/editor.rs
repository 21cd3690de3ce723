//! Polygon helpers for zone editing tools
//!
//! Not used on the evaluation path. Centroid and bounds are planar in
//! longitude/latitude space; area is spherical.

use geo::{BoundingRect, Centroid, ChamberlainDuquetteArea, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, ShapeDefect};
use crate::fixes::Coordinate;

use super::distance::EARTH_RADIUS_M;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }
}

fn to_polygon(vertices: &[Coordinate]) -> Result<Polygon<f64>, GeofenceError> {
    if vertices.len() < 3 {
        return Err(ShapeDefect::TooFewVertices(vertices.len()).into());
    }
    if vertices.iter().any(|v| !v.is_finite()) {
        return Err(ShapeDefect::NonFiniteCoordinate.into());
    }

    let exterior: LineString<f64> = vertices
        .iter()
        .map(|v| (v.longitude, v.latitude))
        .collect();
    Ok(Polygon::new(exterior, vec![]))
}

/// Area-weighted centroid of the polygon
pub fn centroid(vertices: &[Coordinate]) -> Result<Coordinate, GeofenceError> {
    let polygon = to_polygon(vertices)?;

    match polygon.centroid() {
        Some(point) => Ok(Coordinate::new(point.y(), point.x())),
        // Only reachable for fully degenerate rings; fall back to the vertex mean
        None => {
            let n = vertices.len() as f64;
            let (lat, lon) = vertices.iter().fold((0.0, 0.0), |(lat, lon), v| {
                (lat + v.latitude, lon + v.longitude)
            });
            Ok(Coordinate::new(lat / n, lon / n))
        }
    }
}

pub fn bounding_box(vertices: &[Coordinate]) -> Result<BoundingBox, GeofenceError> {
    let polygon = to_polygon(vertices)?;
    let rect = polygon
        .bounding_rect()
        .ok_or(ShapeDefect::TooFewVertices(vertices.len()))?;

    Ok(BoundingBox {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lon: rect.min().x,
        max_lon: rect.max().x,
    })
}

/// Spherical area in square meters
pub fn area(vertices: &[Coordinate]) -> Result<f64, GeofenceError> {
    let polygon = to_polygon(vertices)?;
    Ok(polygon.chamberlain_duquette_unsigned_area())
}

/// Approximate bounds of a circle, widening longitude by latitude
pub fn circle_bounding_box(center: Coordinate, radius_meters: f64) -> BoundingBox {
    let lat_delta = (radius_meters / EARTH_RADIUS_M).to_degrees();
    let lon_scale = center.latitude.to_radians().cos().max(1e-12);
    let lon_delta = (lat_delta / lon_scale).min(180.0);

    BoundingBox {
        min_lat: (center.latitude - lat_delta).max(-90.0),
        max_lat: (center.latitude + lat_delta).min(90.0),
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}
