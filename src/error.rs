//! Error values surfaced by the geofence core
//!
//! The core never formats user-facing messages; callers match on these
//! variants and decide what to show or log.

use thiserror::Error;

/// Why a zone shape was rejected
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ShapeDefect {
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("shape contains a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// Why a location fix was rejected
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FixDefect {
    #[error("accuracy is missing")]
    MissingAccuracy,
    #[error("accuracy must be a finite value >= 0, got {0}")]
    InvalidAccuracy(f64),
    #[error("coordinate is not finite")]
    NonFiniteCoordinate,
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    #[error("invalid shape: {0}")]
    InvalidShape(#[from] ShapeDefect),

    #[error("invalid fix: {0}")]
    InvalidFix(#[from] FixDefect),

    /// Fixes arrived out of order or with identical timestamps
    #[error("non-monotonic fix interval: previous={previous_ms}ms current={current_ms}ms")]
    InvalidInterval { previous_ms: i64, current_ms: i64 },

    /// Fixes are too close together for a stable speed estimate
    #[error("fix interval {elapsed_ms}ms is below the {min_interval_ms}ms minimum")]
    IntervalTooShort { elapsed_ms: i64, min_interval_ms: i64 },
}

impl GeofenceError {
    /// True for errors that only affect motion estimation
    pub fn is_motion_error(&self) -> bool {
        matches!(
            self,
            GeofenceError::InvalidInterval { .. } | GeofenceError::IntervalTooShort { .. }
        )
    }
}
