//! Zonewatch - geofence evaluation engine
//!
//! Evaluates a stream of device location fixes against a shared, live-updated
//! set of zones (circles and polygons) and emits ENTER, EXIT and
//! PREDICTED_CROSSING events.

pub mod engine_config;
pub mod error;
pub mod event_sink;
pub mod events;
pub mod fixes;
pub mod geofence_engine;
pub mod geometry;
pub mod log_format;
pub mod metrics;
pub mod motion;
pub mod prediction;
pub mod proximity;
pub mod zone_feed;
pub mod zone_registry;
pub mod zones;

pub use engine_config::{EngineConfig, ZonewatchConfig};
pub use error::{FixDefect, GeofenceError, ShapeDefect};
pub use event_sink::{ChannelSink, CollectingSink, EventSink, FanoutSink, TracingSink};
pub use events::{CrossingEvent, CrossingKind, EventMetadata};
pub use fixes::{Coordinate, DeviceId, LocationFix};
pub use geofence_engine::{GeofenceEngine, ZoneRuntimeState};
pub use motion::{MotionEstimate, MotionEstimator};
pub use prediction::{BoundaryPredictor, Prediction};
pub use proximity::{NearestZone, ProximitySummary};
pub use zone_feed::ZoneChange;
pub use zone_registry::{ZoneRegistry, ZoneSnapshot};
pub use zones::{AlertLevel, Shape, Zone, ZoneId};
