//! Zone definitions
//!
//! A zone is either a circle around a center point or a closed polygon,
//! plus the alert policy attached to it. Zone definitions are immutable once
//! built; editing geometry means building a new `Shape`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeofenceError, ShapeDefect};
use crate::fixes::Coordinate;

/// Default minimum gap between two predictive alerts for the same zone
pub const DEFAULT_DEBOUNCE_MS: u64 = 60_000;

/// Default look-ahead window for predictive alerts
pub const DEFAULT_PREDICTION_HORIZON_MS: u64 = 30_000;

/// Stable zone identifier, as assigned by the zone feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Low => write!(f, "low"),
            AlertLevel::Medium => write!(f, "medium"),
            AlertLevel::High => write!(f, "high"),
        }
    }
}

/// Zone geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Circle {
        center: Coordinate,
        radius_meters: f64,
    },
    /// Implicitly closed: the last vertex connects back to the first
    Polygon { vertices: Vec<Coordinate> },
}

impl Shape {
    pub fn circle(center: Coordinate, radius_meters: f64) -> Self {
        Shape::Circle {
            center,
            radius_meters,
        }
    }

    pub fn polygon(vertices: Vec<Coordinate>) -> Self {
        Shape::Polygon { vertices }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Polygon { .. } => "polygon",
        }
    }

    /// Structural checks shared by the zone editor and the engine
    pub fn validate(&self) -> Result<(), GeofenceError> {
        match self {
            Shape::Circle {
                center,
                radius_meters,
            } => {
                if !center.is_finite() {
                    return Err(ShapeDefect::NonFiniteCoordinate.into());
                }
                if !radius_meters.is_finite() || *radius_meters <= 0.0 {
                    return Err(ShapeDefect::NonPositiveRadius(*radius_meters).into());
                }
            }
            Shape::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ShapeDefect::TooFewVertices(vertices.len()).into());
                }
                if vertices.iter().any(|v| !v.is_finite()) {
                    return Err(ShapeDefect::NonFiniteCoordinate.into());
                }
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_prediction_horizon_ms() -> u64 {
    DEFAULT_PREDICTION_HORIZON_MS
}

/// A named geographic region with its alert policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(default)]
    pub name: String,
    pub shape: Shape,
    #[serde(default)]
    pub alert_level: AlertLevel,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub predictive_alerts: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_prediction_horizon_ms")]
    pub prediction_horizon_ms: u64,
}

impl Zone {
    pub fn new(id: impl Into<ZoneId>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            shape,
            alert_level: AlertLevel::default(),
            active: true,
            predictive_alerts: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            prediction_horizon_ms: DEFAULT_PREDICTION_HORIZON_MS,
        }
    }

    pub fn circle(id: impl Into<ZoneId>, center: Coordinate, radius_meters: f64) -> Self {
        Self::new(id, Shape::circle(center, radius_meters))
    }

    pub fn polygon(id: impl Into<ZoneId>, vertices: Vec<Coordinate>) -> Self {
        Self::new(id, Shape::polygon(vertices))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_alert_level(mut self, alert_level: AlertLevel) -> Self {
        self.alert_level = alert_level;
        self
    }

    pub fn with_predictive_alerts(mut self, enabled: bool) -> Self {
        self.predictive_alerts = enabled;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_prediction_horizon_ms(mut self, horizon_ms: u64) -> Self {
        self.prediction_horizon_ms = horizon_ms;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Name for log lines, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    pub fn validate(&self) -> Result<(), GeofenceError> {
        self.shape.validate()
    }
}
