//! Applies zone changes from an upstream subscription to the registry
//!
//! The feed only delivers active zones; a zone that goes inactive arrives as
//! `Modified` with `active = false` or as `Removed`, and either way leaves the
//! registry.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::zone_registry::ZoneRegistry;
use crate::zones::{Zone, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "zone", rename_all = "lowercase")]
pub enum ZoneChange {
    Added(Zone),
    Modified(Zone),
    Removed(ZoneId),
}

impl ZoneChange {
    pub fn zone_id(&self) -> &ZoneId {
        match self {
            ZoneChange::Added(zone) | ZoneChange::Modified(zone) => &zone.id,
            ZoneChange::Removed(id) => id,
        }
    }
}

/// Apply a single change to `registry`
pub fn apply(registry: &ZoneRegistry, change: ZoneChange) {
    debug!("Applying zone change for {}", change.zone_id());
    match change {
        ZoneChange::Added(zone) | ZoneChange::Modified(zone) => registry.upsert(zone),
        ZoneChange::Removed(id) => {
            registry.remove(&id);
        }
    }
    metrics::counter!("geofence.zone_changes_total").increment(1);
}

/// Consume changes until every sender is dropped; resolves to the number of
/// changes applied
pub fn spawn_consumer(
    registry: Arc<ZoneRegistry>,
    receiver: flume::Receiver<ZoneChange>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut applied = 0usize;
        while let Ok(change) = receiver.recv_async().await {
            apply(&registry, change);
            applied += 1;
        }
        info!(
            "Zone feed closed after {} changes, registry at version {}",
            applied,
            registry.version()
        );
        applied
    })
}
