//! Shared registry of active zones
//!
//! Copy-on-write: the current zone set is an immutable map behind an `Arc`.
//! Readers clone the `Arc` under a read lock held only for that clone, so a
//! reader never sees a half-applied update. Writers build the next map
//! outside the lock and swap the pointer; a separate mutex keeps two writers
//! from racing and losing each other's changes.
//!
//! Every entry carries the registry version at which its id was last inserted
//! fresh. Modifying a zone keeps that generation; removing and re-adding it
//! starts a new one, so per-device state for the old zone can be told apart.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

use crate::zones::{Zone, ZoneId};

#[derive(Debug, Clone)]
struct ZoneEntry {
    generation: u64,
    zone: Arc<Zone>,
}

type ZoneMap = BTreeMap<ZoneId, ZoneEntry>;

/// Point-in-time view of the registry, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct ZoneSnapshot {
    version: u64,
    zones: Arc<ZoneMap>,
}

impl ZoneSnapshot {
    /// Monotonic counter bumped by every applied change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Arc<Zone>> {
        self.zones.get(id).map(|entry| &entry.zone)
    }

    /// Version at which `id` was inserted as a new zone
    pub fn generation(&self, id: &ZoneId) -> Option<u64> {
        self.zones.get(id).map(|entry| entry.generation)
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.zones.contains_key(id)
    }

    /// Zones ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Zone>> {
        self.zones.values().map(|entry| &entry.zone)
    }

    /// Zones ordered by id, each with its generation
    pub fn iter_with_generation(&self) -> impl Iterator<Item = (u64, &Arc<Zone>)> {
        self.zones
            .values()
            .map(|entry| (entry.generation, &entry.zone))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.zones.keys()
    }
}

#[derive(Debug, Default)]
pub struct ZoneRegistry {
    current: RwLock<ZoneSnapshot>,
    writer: Mutex<()>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `zones`
    pub fn with_zones(zones: impl IntoIterator<Item = Zone>) -> Self {
        let registry = Self::new();
        for zone in zones {
            registry.upsert(zone);
        }
        registry
    }

    /// The latest applied zone set
    pub fn snapshot(&self) -> ZoneSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn get(&self, id: &ZoneId) -> Option<Arc<Zone>> {
        self.snapshot().get(id).cloned()
    }

    /// Insert or replace a zone
    ///
    /// An inactive zone is not part of the active set, so upserting one
    /// removes any previous definition with the same id.
    pub fn upsert(&self, zone: Zone) {
        if !zone.active {
            debug!("Zone {} marked inactive, removing from registry", zone.id);
            self.remove(&zone.id);
            return;
        }

        let id = zone.id.clone();
        let zone = Arc::new(zone);
        let replaced = self.apply(|zones, version| match zones.get_mut(&id) {
            Some(entry) => {
                entry.zone = zone;
                true
            }
            None => {
                zones.insert(
                    id.clone(),
                    ZoneEntry {
                        generation: version,
                        zone,
                    },
                );
                false
            }
        });

        if replaced {
            debug!("Zone {} updated", id);
        } else {
            info!("Zone {} added", id);
        }
    }

    /// Remove a zone; returns whether it was present
    pub fn remove(&self, id: &ZoneId) -> bool {
        let removed = self.apply(|zones, _| zones.remove(id).is_some());
        if removed {
            info!("Zone {} removed", id);
        }
        removed
    }

    /// Remove every zone
    pub fn clear(&self) {
        self.apply(|zones, _| zones.clear());
    }

    /// Build and publish the next snapshot; `change` receives its version
    fn apply<R>(&self, change: impl FnOnce(&mut ZoneMap, u64) -> R) -> R {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let base = self.snapshot();
        let version = base.version + 1;
        let mut next = (*base.zones).clone();
        let result = change(&mut next, version);

        let next = ZoneSnapshot {
            version,
            zones: Arc::new(next),
        };
        let zone_count = next.len();

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;

        metrics::gauge!("geofence.registry_zones").set(zone_count as f64);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::Coordinate;

    fn circle(id: &str, radius: f64) -> Zone {
        Zone::circle(id, Coordinate::new(0.0, 0.0), radius)
    }

    #[test]
    fn test_upsert_and_remove() {
        let registry = ZoneRegistry::new();
        assert!(registry.is_empty());

        registry.upsert(circle("a", 100.0));
        registry.upsert(circle("b", 200.0));
        assert_eq!(registry.len(), 2);

        registry.upsert(circle("a", 150.0));
        assert_eq!(registry.len(), 2);
        let a = registry.get(&ZoneId::from("a")).unwrap();
        assert_eq!(a.shape, circle("a", 150.0).shape);

        assert!(registry.remove(&ZoneId::from("a")));
        assert!(!registry.remove(&ZoneId::from("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_changes() {
        let registry = ZoneRegistry::with_zones([circle("a", 100.0)]);
        let before = registry.snapshot();

        registry.upsert(circle("b", 100.0));
        registry.remove(&ZoneId::from("a"));

        assert_eq!(before.len(), 1);
        assert!(before.contains(&ZoneId::from("a")));

        let after = registry.snapshot();
        assert!(after.version() > before.version());
        assert_eq!(after.ids().cloned().collect::<Vec<_>>(), vec![ZoneId::from("b")]);
    }

    #[test]
    fn test_generation_survives_modify_but_not_readd() {
        let registry = ZoneRegistry::with_zones([circle("a", 100.0)]);
        let id = ZoneId::from("a");
        let first = registry.snapshot().generation(&id).unwrap();

        registry.upsert(circle("a", 200.0));
        assert_eq!(registry.snapshot().generation(&id), Some(first));

        registry.remove(&id);
        assert_eq!(registry.snapshot().generation(&id), None);

        registry.upsert(circle("a", 100.0));
        let readded = registry.snapshot().generation(&id).unwrap();
        assert!(readded > first);
    }

    #[test]
    fn test_inactive_upsert_removes_zone() {
        let registry = ZoneRegistry::with_zones([circle("a", 100.0)]);
        registry.upsert(circle("a", 100.0).inactive());
        assert!(registry.is_empty());

        // Never-seen inactive zone is simply not added
        registry.upsert(circle("z", 100.0).inactive());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_iterates_in_id_order() {
        let registry = ZoneRegistry::with_zones([
            circle("charlie", 1.0),
            circle("alpha", 1.0),
            circle("bravo", 1.0),
        ]);
        let ids: Vec<_> = registry
            .snapshot()
            .iter()
            .map(|z| z.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let registry = Arc::new(ZoneRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        registry.upsert(circle(&format!("zone-{t}-{i}"), 10.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 400);
        assert_eq!(snapshot.version(), 400);
    }
}
