//! Crossing events emitted by the engine
//!
//! The JSON shape matches the geofence log records consumed by the
//! notification and webhook fan-out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fixes::{DeviceId, LocationFix};
use crate::zones::{AlertLevel, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossingKind {
    Enter,
    Exit,
    PredictedCrossing,
}

impl fmt::Display for CrossingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossingKind::Enter => write!(f, "ENTER"),
            CrossingKind::Exit => write!(f, "EXIT"),
            CrossingKind::PredictedCrossing => write!(f, "PREDICTED_CROSSING"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Time spent inside the zone, EXIT only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Estimated time until the boundary is reached, PREDICTED_CROSSING only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingEvent {
    pub device_id: DeviceId,
    pub zone_id: ZoneId,
    pub alert_level: AlertLevel,
    pub kind: CrossingKind,
    pub at_fix: LocationFix,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl CrossingEvent {
    pub fn timestamp_millis(&self) -> i64 {
        self.at_fix.timestamp_millis
    }
}
