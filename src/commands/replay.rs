use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, info_span, warn};

use zonewatch::metrics::{init_metrics, initialize_geofence_metrics};
use zonewatch::{DeviceId, GeofenceEngine, LocationFix, TracingSink, ZoneRegistry, ZonewatchConfig};

/// Check for idle sessions every this many fixes
const EVICTION_INTERVAL: usize = 1_000;

/// One NDJSON line: a fix tagged with its device
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayRecord {
    device_id: DeviceId,
    #[serde(flatten)]
    fix: LocationFix,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ReplayStats {
    lines: usize,
    malformed: usize,
    rejected: usize,
    events: usize,
}

/// Replay recorded fixes through the engine, writing events to stdout
pub fn handle_replay(fixes_path: &Path, config: ZonewatchConfig, metrics: bool) -> Result<()> {
    let metrics_handle = if metrics {
        let handle = init_metrics()?;
        initialize_geofence_metrics();
        Some(handle)
    } else {
        None
    };

    let registry = Arc::new(ZoneRegistry::with_zones(config.zones));
    info!(
        "Replaying {} against {} zones",
        fixes_path.display(),
        registry.len()
    );

    let engine = GeofenceEngine::new(registry, Arc::new(TracingSink), config.engine);

    let file = File::open(fixes_path)
        .with_context(|| format!("Failed to open fixes file {}", fixes_path.display()))?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let stats = replay_stream(&engine, BufReader::new(file), &mut out)?;

    info!(
        "Replay finished: {} fixes, {} malformed, {} rejected, {} events, {} devices",
        stats.lines,
        stats.malformed,
        stats.rejected,
        stats.events,
        engine.device_count()
    );

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

/// Feed NDJSON fixes from `reader` through `engine`, writing each event as a
/// JSON line to `out`
///
/// Lines that are not UTF-8 or not valid records are counted and skipped.
/// Read and write failures abort the replay.
fn replay_stream<R: BufRead, W: Write>(
    engine: &GeofenceEngine,
    mut reader: R,
    out: &mut W,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    let mut latest_millis = i64::MIN;
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read line {}", line_number + 1))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                stats.lines += 1;
                stats.malformed += 1;
                warn!("Skipping line {} that is not UTF-8: {}", line_number, e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        let record: ReplayRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                stats.malformed += 1;
                warn!("Skipping malformed line {}: {}", line_number, e);
                continue;
            }
        };

        let span = info_span!("replay", device_id = %record.device_id);
        let _guard = span.enter();

        match engine.evaluate(&record.device_id, &record.fix) {
            Ok(events) => {
                for event in &events {
                    serde_json::to_writer(&mut *out, event)?;
                    out.write_all(b"\n")?;
                }
                stats.events += events.len();
            }
            Err(_) => {
                // Already logged by the engine
                stats.rejected += 1;
            }
        }

        latest_millis = latest_millis.max(record.fix.timestamp_millis);
        if stats.lines % EVICTION_INTERVAL == 0 {
            engine.evict_idle_sessions(latest_millis);
        }
    }

    out.flush()?;
    Ok(stats)
}
