use anyhow::Result;
use serde::Serialize;
use std::f64::consts::PI;
use std::io::Write;
use tracing::{info, warn};

use zonewatch::geometry::editor::circle_bounding_box;
use zonewatch::geometry::{BoundingBox, area, bounding_box, centroid, geohash};
use zonewatch::{AlertLevel, Coordinate, GeofenceError, Shape, Zone, ZoneId, ZonewatchConfig};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ZoneSummary<'a> {
    zone_id: &'a ZoneId,
    name: &'a str,
    shape: &'static str,
    alert_level: AlertLevel,
    predictive_alerts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounding_box: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    centroid: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    area_square_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geohash: Option<String>,
    /// Cells around `geohash`, for prefix lookups that straddle a cell edge
    #[serde(skip_serializing_if = "Option::is_none")]
    geohash_neighbors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

struct Footprint {
    bounding_box: BoundingBox,
    centroid: Coordinate,
    radius_meters: Option<f64>,
    area_square_meters: f64,
}

fn footprint(shape: &Shape) -> Result<Footprint, GeofenceError> {
    shape.validate()?;
    match shape {
        Shape::Circle {
            center,
            radius_meters,
        } => Ok(Footprint {
            bounding_box: circle_bounding_box(*center, *radius_meters),
            centroid: *center,
            radius_meters: Some(*radius_meters),
            area_square_meters: PI * radius_meters * radius_meters,
        }),
        Shape::Polygon { vertices } => Ok(Footprint {
            bounding_box: bounding_box(vertices)?,
            centroid: centroid(vertices)?,
            radius_meters: None,
            area_square_meters: area(vertices)?,
        }),
    }
}

fn summarize_zone(zone: &Zone, geohash_precision: usize) -> ZoneSummary<'_> {
    let mut summary = ZoneSummary {
        zone_id: &zone.id,
        name: zone.display_name(),
        shape: zone.shape.kind(),
        alert_level: zone.alert_level,
        predictive_alerts: zone.predictive_alerts,
        bounding_box: None,
        centroid: None,
        radius_meters: None,
        area_square_meters: None,
        geohash: None,
        geohash_neighbors: None,
        error: None,
    };

    match footprint(&zone.shape) {
        Ok(fp) => {
            summary.bounding_box = Some(fp.bounding_box);
            summary.centroid = Some(fp.centroid);
            summary.radius_meters = fp.radius_meters;
            summary.area_square_meters = Some(fp.area_square_meters);
            summary.geohash = geohash::encode(fp.centroid, geohash_precision);
            summary.geohash_neighbors = summary.geohash.as_deref().and_then(geohash::neighbors);
        }
        Err(e) => {
            warn!("Zone {} has invalid geometry: {}", zone.id, e);
            summary.error = Some(e.to_string());
        }
    }

    summary
}

/// Print one JSON line per configured zone describing its footprint
pub fn handle_inspect(config: &ZonewatchConfig, geohash_precision: usize) -> Result<()> {
    if !(1..=geohash::MAX_PRECISION).contains(&geohash_precision) {
        anyhow::bail!(
            "geohash precision must be between 1 and {}, got {}",
            geohash::MAX_PRECISION,
            geohash_precision
        );
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for zone in &config.zones {
        serde_json::to_writer(&mut out, &summarize_zone(zone, geohash_precision))?;
        out.write_all(b"\n")?;
    }

    info!("Inspected {} zones", config.zones.len());
    Ok(())
}
