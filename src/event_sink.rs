//! Event sinks: where crossing events go once the engine emits them
//!
//! Delivery (push, SMS, webhooks, persistence) lives behind this trait.
//! `emit` is called synchronously from inside `GeofenceEngine::evaluate`, so
//! implementations must not block; hand work off to a channel instead.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender, TrySendError};
use tracing::{info, warn};

use crate::events::CrossingEvent;

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CrossingEvent);
}

impl<F> EventSink for F
where
    F: Fn(&CrossingEvent) + Send + Sync,
{
    fn emit(&self, event: &CrossingEvent) {
        self(event)
    }
}

/// Writes one structured log line per event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &CrossingEvent) {
        let at = DateTime::<Utc>::from_timestamp_millis(event.timestamp_millis())
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| event.timestamp_millis().to_string());

        info!(
            device_id = %event.device_id,
            zone_id = %event.zone_id,
            alert_level = %event.alert_level,
            duration_ms = event.metadata.duration_ms,
            eta_ms = event.metadata.eta_ms,
            speed_mps = event.metadata.speed_mps,
            "{} at {} {}",
            event.kind,
            event.at_fix.coordinate,
            at
        );
    }
}

/// Hands events to a bounded channel without blocking the evaluation
///
/// When the consumer falls behind the event is dropped and counted in
/// `geofence.sink_dropped_total`.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<CrossingEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<CrossingEvent>) -> Self {
        Self { sender }
    }

    pub fn bounded(capacity: usize) -> (Self, Receiver<CrossingEvent>) {
        let (sender, receiver) = flume::bounded(capacity);
        (Self::new(sender), receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &CrossingEvent) {
        match self.sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                metrics::counter!("geofence.sink_dropped_total", "reason" => "full").increment(1);
                warn!(
                    "Event queue full, dropping {} for device {} zone {}",
                    dropped.kind, dropped.device_id, dropped.zone_id
                );
            }
            Err(TrySendError::Disconnected(dropped)) => {
                metrics::counter!("geofence.sink_dropped_total", "reason" => "disconnected")
                    .increment(1);
                warn!(
                    "Event consumer gone, dropping {} for device {} zone {}",
                    dropped.kind, dropped.device_id, dropped.zone_id
                );
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<CrossingEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CrossingEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain everything collected so far
    pub fn take(&self) -> Vec<CrossingEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &CrossingEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Forwards every event to each inner sink in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &CrossingEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
