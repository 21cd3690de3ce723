use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder
/// Returns a handle that renders the current scrape text on demand
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        // Evaluations are sub-millisecond for small zone sets
        // Buckets: 10us, 50us, 100us, 250us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms
        .set_buckets_for_metric(
            Matcher::Full("geofence.evaluate_duration_seconds".to_string()),
            &[
                0.00001, 0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
            ],
        )
        .context("Failed to set buckets for geofence.evaluate_duration_seconds")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Initialize geofence metrics to zero/default values
/// This ensures metrics always appear in the scrape even if no events have occurred
pub fn initialize_geofence_metrics() {
    // Evaluation
    metrics::counter!("geofence.evaluations_total").absolute(0);
    metrics::counter!("geofence.invalid_fixes_total").absolute(0);
    metrics::counter!("geofence.zone_skips_total").absolute(0);

    // Emitted transitions
    metrics::counter!("geofence.enter_events_total").absolute(0);
    metrics::counter!("geofence.exit_events_total").absolute(0);
    metrics::counter!("geofence.predicted_crossings_total").absolute(0);
    metrics::counter!("geofence.sink_dropped_total", "reason" => "full").absolute(0);
    metrics::counter!("geofence.sink_dropped_total", "reason" => "disconnected").absolute(0);

    // State
    metrics::gauge!("geofence.registry_zones").set(0.0);
    metrics::gauge!("geofence.active_devices").set(0.0);
    metrics::counter!("geofence.sessions_evicted_total").absolute(0);
    metrics::counter!("geofence.zone_changes_total").absolute(0);
}
