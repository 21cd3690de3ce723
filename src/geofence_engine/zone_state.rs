use std::collections::HashMap;

use crate::fixes::LocationFix;
use crate::zone_registry::ZoneSnapshot;
use crate::zones::ZoneId;

/// What the engine remembers about one device relative to one zone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneRuntimeState {
    /// Registry generation of the zone this state was built against
    pub zone_generation: u64,
    pub last_containment: bool,
    /// Timestamp of the most recent ENTER
    pub entered_at_millis: Option<i64>,
    /// Timestamp of the most recent PREDICTED_CROSSING, used for debouncing
    pub last_transition_at_millis: Option<i64>,
    pub last_fix: Option<LocationFix>,
}

/// All zone states for a single device
#[derive(Debug, Default)]
pub(crate) struct DeviceSession {
    pub zones: HashMap<ZoneId, ZoneRuntimeState>,
    pub last_seen_millis: i64,
}

impl ZoneRuntimeState {
    pub fn new(zone_generation: u64) -> Self {
        Self {
            zone_generation,
            ..Default::default()
        }
    }
}

impl DeviceSession {
    /// Drop state for zones that were removed, including ones re-added under
    /// the same id since; returns how many went
    pub fn prune(&mut self, snapshot: &ZoneSnapshot) -> usize {
        let before = self.zones.len();
        self.zones
            .retain(|zone_id, state| snapshot.generation(zone_id) == Some(state.zone_generation));
        before - self.zones.len()
    }

    pub fn inside_zones(&self) -> Vec<ZoneId> {
        let mut inside: Vec<ZoneId> = self
            .zones
            .iter()
            .filter(|(_, state)| state.last_containment)
            .map(|(zone_id, _)| zone_id.clone())
            .collect();
        inside.sort();
        inside
    }
}
