//! Predictive boundary crossing
//!
//! Extrapolates the device's current speed onto its distance from a zone's
//! boundary. The heading is not taken into account: a device moving fast
//! enough near the edge is flagged whichever way it is pointing.

use serde::{Deserialize, Serialize};

use crate::error::GeofenceError;
use crate::fixes::LocationFix;
use crate::geometry::distance_to_boundary;
use crate::motion::MotionEstimator;
use crate::zones::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub will_cross: bool,
    /// `f64::INFINITY` for a stationary device
    pub eta_ms: f64,
    pub speed_mps: f64,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryPredictor {
    estimator: MotionEstimator,
}

impl BoundaryPredictor {
    pub fn new(estimator: MotionEstimator) -> Self {
        Self { estimator }
    }

    /// Forecast whether the device will reach `zone`'s boundary within the
    /// zone's prediction horizon
    ///
    /// Assumes the caller already knows the device is outside the zone.
    pub fn predict(
        &self,
        current: &LocationFix,
        previous: &LocationFix,
        zone: &Zone,
    ) -> Result<Prediction, GeofenceError> {
        let distance_meters = distance_to_boundary(current.coordinate, &zone.shape)?;
        let motion = self.estimator.estimate(previous, current)?;
        let speed_mps = motion.speed_mps;

        let eta_ms = if speed_mps > 0.0 {
            distance_meters / speed_mps * 1000.0
        } else {
            f64::INFINITY
        };

        let will_cross = speed_mps > 0.0 && eta_ms < zone.prediction_horizon_ms as f64;

        Ok(Prediction {
            will_cross,
            eta_ms,
            speed_mps,
            distance_meters,
        })
    }
}
