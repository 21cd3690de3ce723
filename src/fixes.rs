//! Location fixes as delivered by the location provider

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FixDefect, GeofenceError};

/// A point on the earth's surface in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Check finiteness and the [-90, 90] / [-180, 180] ranges
    pub fn validate(&self) -> Result<(), FixDefect> {
        if !self.is_finite() {
            return Err(FixDefect::NonFiniteCoordinate);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(FixDefect::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(FixDefect::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Stable identifier of a tracked device
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single timestamped location reading
///
/// `accuracy` is optional on the wire because some providers omit it;
/// the engine rejects such fixes rather than guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub timestamp_millis: i64,
}

impl LocationFix {
    pub fn new(coordinate: Coordinate, accuracy: f64, timestamp_millis: i64) -> Self {
        Self {
            coordinate,
            accuracy: Some(accuracy),
            timestamp_millis,
        }
    }

    /// Reject fixes that cannot be evaluated safely
    pub fn validate(&self) -> Result<(), GeofenceError> {
        match self.accuracy {
            None => return Err(FixDefect::MissingAccuracy.into()),
            Some(accuracy) if !accuracy.is_finite() || accuracy < 0.0 => {
                return Err(FixDefect::InvalidAccuracy(accuracy).into());
            }
            Some(_) => {}
        }
        self.coordinate.validate()?;
        Ok(())
    }
}
