mod transitions;
mod zone_state;

pub use zone_state::ZoneRuntimeState;

use dashmap::DashMap;
use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::engine_config::EngineConfig;
use crate::error::GeofenceError;
use crate::event_sink::EventSink;
use crate::events::{CrossingEvent, CrossingKind};
use crate::fixes::{DeviceId, LocationFix};
use crate::motion::MotionEstimator;
use crate::prediction::BoundaryPredictor;
use crate::zone_registry::ZoneRegistry;
use crate::zones::ZoneId;

use transitions::advance;
use zone_state::DeviceSession;

/// Per-device session map; DashMap shards keep one device's evaluation from
/// blocking another's
type SessionsMap = DashMap<DeviceId, DeviceSession>;

/// Evaluates location fixes against every zone in the registry and emits
/// ENTER, EXIT and PREDICTED_CROSSING events
pub struct GeofenceEngine {
    registry: Arc<ZoneRegistry>,
    sink: Arc<dyn EventSink>,
    predictor: BoundaryPredictor,
    config: EngineConfig,
    sessions: SessionsMap,
}

impl GeofenceEngine {
    pub fn new(registry: Arc<ZoneRegistry>, sink: Arc<dyn EventSink>, config: EngineConfig) -> Self {
        let predictor =
            BoundaryPredictor::new(MotionEstimator::new(config.min_motion_interval_ms));
        Self {
            registry,
            sink,
            predictor,
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one fix for `device_id` against the current zone set
    ///
    /// An invalid fix is rejected before any state changes. Zones with broken
    /// geometry are skipped individually. Every event is handed to the sink,
    /// in order, before this returns, and is also returned to the caller.
    pub fn evaluate(
        &self,
        device_id: &DeviceId,
        fix: &LocationFix,
    ) -> Result<Vec<CrossingEvent>, GeofenceError> {
        let start = Instant::now();

        if let Err(e) = fix.validate() {
            counter!("geofence.invalid_fixes_total").increment(1);
            warn!("Rejected fix from device {}: {}", device_id, e);
            return Err(e);
        }

        let snapshot = self.registry.snapshot();
        let mut events = Vec::new();

        {
            let mut session = self.sessions.entry(device_id.clone()).or_default();
            let pruned = session.prune(&snapshot);
            if pruned > 0 {
                debug!("Dropped state for {} removed zones on device {}", pruned, device_id);
            }
            session.last_seen_millis = fix.timestamp_millis;

            for (generation, zone) in snapshot.iter_with_generation() {
                let mut state = session
                    .zones
                    .get(&zone.id)
                    .filter(|state| state.zone_generation == generation)
                    .cloned()
                    .unwrap_or_else(|| ZoneRuntimeState::new(generation));

                match advance(&mut state, zone, fix, &self.predictor) {
                    Ok(transition) => {
                        session.zones.insert(zone.id.clone(), state);
                        if let Some(transition) = transition {
                            events.push(CrossingEvent {
                                device_id: device_id.clone(),
                                zone_id: zone.id.clone(),
                                alert_level: zone.alert_level,
                                kind: transition.kind,
                                at_fix: fix.clone(),
                                metadata: transition.metadata,
                            });
                        }
                    }
                    Err(e) => {
                        counter!("geofence.zone_skips_total").increment(1);
                        warn!(
                            "Skipping zone {} ({}) for device {}: {}",
                            zone.id,
                            zone.shape.kind(),
                            device_id,
                            e
                        );
                    }
                }
            }
        }

        for event in &events {
            match event.kind {
                CrossingKind::Enter => counter!("geofence.enter_events_total").increment(1),
                CrossingKind::Exit => counter!("geofence.exit_events_total").increment(1),
                CrossingKind::PredictedCrossing => {
                    counter!("geofence.predicted_crossings_total").increment(1)
                }
            }
            self.sink.emit(event);
        }

        counter!("geofence.evaluations_total").increment(1);
        histogram!("geofence.evaluate_duration_seconds").record(start.elapsed().as_secs_f64());
        gauge!("geofence.active_devices").set(self.sessions.len() as f64);

        trace!(
            "Evaluated fix for device {} against {} zones (registry v{}), {} events",
            device_id,
            snapshot.len(),
            snapshot.version(),
            events.len()
        );

        Ok(events)
    }

    /// Forget everything about a device; returns whether it had a session
    pub fn end_session(&self, device_id: &DeviceId) -> bool {
        let removed = self.sessions.remove(device_id).is_some();
        if removed {
            debug!("Ended session for device {}", device_id);
            gauge!("geofence.active_devices").set(self.sessions.len() as f64);
        }
        removed
    }

    /// Remove sessions whose last fix is older than the configured idle
    /// timeout; a no-op when no timeout is configured
    pub fn evict_idle_sessions(&self, now_millis: i64) -> usize {
        let Some(timeout_ms) = self.config.session_idle_timeout_ms else {
            return 0;
        };

        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now_millis.saturating_sub(session.last_seen_millis) < timeout_ms);
        let evicted = before.saturating_sub(self.sessions.len());

        if evicted > 0 {
            info!(
                "Evicted {} idle device sessions ({} remaining)",
                evicted,
                self.sessions.len()
            );
            counter!("geofence.sessions_evicted_total").increment(evicted as u64);
        }
        gauge!("geofence.active_devices").set(self.sessions.len() as f64);
        evicted
    }

    /// Last known containment of a device in a zone, `None` if never
    /// evaluated against the zone currently registered under `zone_id`
    pub fn containment(&self, device_id: &DeviceId, zone_id: &ZoneId) -> Option<bool> {
        self.zone_state(device_id, zone_id)
            .map(|state| state.last_containment)
    }

    /// Zones the device was inside at its last fix, sorted by id
    pub fn inside_zones(&self, device_id: &DeviceId) -> Vec<ZoneId> {
        let snapshot = self.registry.snapshot();
        self.sessions
            .get(device_id)
            .map(|session| {
                session
                    .inside_zones()
                    .into_iter()
                    .filter(|zone_id| {
                        session.zones.get(zone_id).map(|s| s.zone_generation)
                            == snapshot.generation(zone_id)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copy of one device×zone runtime state
    ///
    /// State left over from a removed zone is not reported, even before the
    /// device's next fix prunes it.
    pub fn zone_state(&self, device_id: &DeviceId, zone_id: &ZoneId) -> Option<ZoneRuntimeState> {
        let generation = self.registry.snapshot().generation(zone_id)?;
        self.sessions.get(device_id).and_then(|session| {
            session
                .zones
                .get(zone_id)
                .filter(|state| state.zone_generation == generation)
                .cloned()
        })
    }

    pub fn device_count(&self) -> usize {
        self.sessions.len()
    }
}
