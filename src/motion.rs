//! Speed and heading between two consecutive fixes

use serde::{Deserialize, Serialize};

use crate::error::GeofenceError;
use crate::fixes::LocationFix;
use crate::geometry::{haversine_distance, initial_bearing};

/// Shortest interval that yields a usable speed
pub const DEFAULT_MIN_INTERVAL_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionEstimate {
    pub speed_mps: f64,
    /// Initial great-circle bearing from the previous fix, [0, 360)
    pub heading_degrees: f64,
    pub elapsed_ms: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionEstimator {
    min_interval_ms: i64,
}

impl Default for MotionEstimator {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl MotionEstimator {
    pub fn new(min_interval_ms: i64) -> Self {
        Self { min_interval_ms }
    }

    pub fn min_interval_ms(&self) -> i64 {
        self.min_interval_ms
    }

    /// Estimate motion from `previous` to `current`
    ///
    /// Out-of-order or duplicate timestamps fail with `InvalidInterval`;
    /// intervals under the minimum fail with `IntervalTooShort` so the caller
    /// can keep its previous estimate instead of dividing by almost nothing.
    pub fn estimate(
        &self,
        previous: &LocationFix,
        current: &LocationFix,
    ) -> Result<MotionEstimate, GeofenceError> {
        if current.timestamp_millis <= previous.timestamp_millis {
            return Err(GeofenceError::InvalidInterval {
                previous_ms: previous.timestamp_millis,
                current_ms: current.timestamp_millis,
            });
        }

        let elapsed_ms = current
            .timestamp_millis
            .saturating_sub(previous.timestamp_millis);
        if elapsed_ms < self.min_interval_ms {
            return Err(GeofenceError::IntervalTooShort {
                elapsed_ms,
                min_interval_ms: self.min_interval_ms,
            });
        }

        let distance_m = haversine_distance(previous.coordinate, current.coordinate);
        let speed_mps = distance_m / (elapsed_ms as f64 / 1000.0);

        Ok(MotionEstimate {
            speed_mps,
            heading_degrees: initial_bearing(previous.coordinate, current.coordinate),
            elapsed_ms,
        })
    }
}
