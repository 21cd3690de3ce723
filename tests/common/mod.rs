//! Shared fixtures for engine integration tests
#![allow(dead_code)]

use std::sync::Arc;

use zonewatch::geometry::distance::destination_point;
use zonewatch::{
    CollectingSink, Coordinate, DeviceId, EngineConfig, GeofenceEngine, LocationFix, Zone,
    ZoneRegistry,
};

pub const PARIS: Coordinate = Coordinate::new(48.8566, 2.3522);

pub struct Harness {
    pub registry: Arc<ZoneRegistry>,
    pub sink: Arc<CollectingSink>,
    pub engine: GeofenceEngine,
}

impl Harness {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self::with_config(zones, EngineConfig::default())
    }

    pub fn with_config(zones: Vec<Zone>, config: EngineConfig) -> Self {
        let registry = Arc::new(ZoneRegistry::with_zones(zones));
        let sink = Arc::new(CollectingSink::new());
        let engine = GeofenceEngine::new(Arc::clone(&registry), sink.clone(), config);
        Self {
            registry,
            sink,
            engine,
        }
    }
}

/// Fix `meters` due north of `origin`
pub fn fix_north_of(origin: Coordinate, meters: f64, timestamp_millis: i64) -> LocationFix {
    LocationFix::new(
        destination_point(origin, 0.0, meters),
        5.0,
        timestamp_millis,
    )
}

pub fn fix(latitude: f64, longitude: f64, timestamp_millis: i64) -> LocationFix {
    LocationFix::new(Coordinate::new(latitude, longitude), 5.0, timestamp_millis)
}

pub fn device(id: &str) -> DeviceId {
    DeviceId::from(id)
}

pub fn paris_zone() -> Zone {
    Zone::circle("paris", PARIS, 500.0).with_name("Paris center")
}
