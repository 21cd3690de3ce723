//! Zone feed consumer feeding a registry while the engine evaluates
mod common;

use std::sync::Arc;

use common::{Harness, PARIS, device, fix_north_of, paris_zone};
use zonewatch::zone_feed::{self, ZoneChange};
use zonewatch::{Coordinate, CrossingKind, Zone, ZoneId, ZoneRegistry};

#[tokio::test]
async fn test_consumer_applies_changes_until_disconnect() {
    let registry = Arc::new(ZoneRegistry::new());
    let (sender, receiver) = flume::unbounded();
    let handle = zone_feed::spawn_consumer(Arc::clone(&registry), receiver);

    sender
        .send_async(ZoneChange::Added(paris_zone()))
        .await
        .unwrap();
    sender
        .send_async(ZoneChange::Added(Zone::circle(
            "lyon",
            Coordinate::new(45.764, 4.8357),
            300.0,
        )))
        .await
        .unwrap();
    sender
        .send_async(ZoneChange::Modified(paris_zone().with_name("Paris")))
        .await
        .unwrap();
    sender
        .send_async(ZoneChange::Removed(ZoneId::from("lyon")))
        .await
        .unwrap();
    drop(sender);

    let applied = handle.await.unwrap();
    assert_eq!(applied, 4);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(&ZoneId::from("paris")).unwrap().name, "Paris");
    assert_eq!(registry.version(), 4);
}

#[tokio::test]
async fn test_engine_sees_zones_delivered_by_feed() {
    let h = Harness::new(vec![]);
    let (sender, receiver) = flume::bounded(8);
    let handle = zone_feed::spawn_consumer(Arc::clone(&h.registry), receiver);
    let d = device("d");

    assert!(
        h.engine
            .evaluate(&d, &fix_north_of(PARIS, 10.0, 0))
            .unwrap()
            .is_empty()
    );

    sender
        .send_async(ZoneChange::Added(paris_zone()))
        .await
        .unwrap();
    drop(sender);
    handle.await.unwrap();

    let events = h.engine.evaluate(&d, &fix_north_of(PARIS, 10.0, 5_000)).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, CrossingKind::Enter);
}

#[tokio::test]
async fn test_inactive_modification_removes_zone() {
    let registry = Arc::new(ZoneRegistry::with_zones([paris_zone()]));
    let (sender, receiver) = flume::unbounded();
    let handle = zone_feed::spawn_consumer(Arc::clone(&registry), receiver);

    sender.send(ZoneChange::Modified(paris_zone().inactive())).unwrap();
    drop(sender);

    assert_eq!(handle.await.unwrap(), 1);
    assert!(registry.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_updates() {
    let registry = Arc::new(ZoneRegistry::new());
    let (sender, receiver) = flume::unbounded();
    let handle = zone_feed::spawn_consumer(Arc::clone(&registry), receiver);

    let reader = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let mut last_version = 0;
            for _ in 0..500 {
                let snapshot = registry.snapshot();
                assert!(snapshot.version() >= last_version);
                // Every zone in a snapshot is complete and self-consistent
                for zone in snapshot.iter() {
                    assert!(zone.id.as_str().starts_with("zone-"));
                    assert!(zone.validate().is_ok());
                }
                last_version = snapshot.version();
                tokio::task::yield_now().await;
            }
        })
    };

    for i in 0..200 {
        let zone = Zone::circle(format!("zone-{}", i % 20), PARIS, 10.0 + i as f64);
        sender.send_async(ZoneChange::Added(zone)).await.unwrap();
    }
    drop(sender);

    assert_eq!(handle.await.unwrap(), 200);
    reader.await.unwrap();
    assert_eq!(registry.len(), 20);
    assert_eq!(registry.version(), 200);
}
