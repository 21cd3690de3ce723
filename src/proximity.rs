//! Stateless "where am I relative to the zones" query used by map views

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fixes::Coordinate;
use crate::geometry::{contains_point, distance_to_boundary};
use crate::zone_registry::ZoneSnapshot;
use crate::zones::{AlertLevel, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestZone {
    pub zone_id: ZoneId,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximitySummary {
    /// Zones containing the point, in id order
    pub inside: Vec<ZoneId>,
    /// Closest zone boundary among the zones not containing the point
    pub nearest_outside: Option<NearestZone>,
    pub in_high_alert_zone: bool,
}

pub fn summarize(point: Coordinate, snapshot: &ZoneSnapshot) -> ProximitySummary {
    let mut summary = ProximitySummary::default();

    for zone in snapshot.iter() {
        let inside = match contains_point(point, &zone.shape) {
            Ok(inside) => inside,
            Err(e) => {
                warn!("Skipping zone {} in proximity summary: {}", zone.id, e);
                continue;
            }
        };

        if inside {
            summary.inside.push(zone.id.clone());
            summary.in_high_alert_zone |= zone.alert_level == AlertLevel::High;
            continue;
        }

        // Geometry already validated by contains_point
        let Ok(distance_meters) = distance_to_boundary(point, &zone.shape) else {
            continue;
        };
        let closer = summary
            .nearest_outside
            .as_ref()
            .is_none_or(|nearest| distance_meters < nearest.distance_meters);
        if closer {
            summary.nearest_outside = Some(NearestZone {
                zone_id: zone.id.clone(),
                distance_meters,
            });
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance::destination_point;
    use crate::zone_registry::ZoneRegistry;
    use crate::zones::Zone;

    const ORIGIN: Coordinate = Coordinate::new(10.0, 10.0);

    #[test]
    fn test_summary_inside_and_nearest() {
        let registry = ZoneRegistry::with_zones([
            Zone::circle("home", ORIGIN, 200.0).with_alert_level(AlertLevel::High),
            Zone::circle("near", destination_point(ORIGIN, 90.0, 1_000.0), 300.0),
            Zone::circle("far", destination_point(ORIGIN, 180.0, 5_000.0), 300.0),
            Zone::circle("broken", ORIGIN, -5.0),
        ]);

        let summary = summarize(ORIGIN, &registry.snapshot());

        assert_eq!(summary.inside, vec![ZoneId::from("home")]);
        assert!(summary.in_high_alert_zone);
        let nearest = summary.nearest_outside.unwrap();
        assert_eq!(nearest.zone_id, ZoneId::from("near"));
        assert!((nearest.distance_meters - 700.0).abs() < 1.0);
    }

    #[test]
    fn test_empty_registry() {
        let summary = summarize(ORIGIN, &ZoneRegistry::new().snapshot());
        assert_eq!(summary, ProximitySummary::default());
    }
}
