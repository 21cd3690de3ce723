use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use zonewatch::proximity::summarize;
use zonewatch::{Coordinate, ProximitySummary, ZoneRegistry, ZonewatchConfig};

fn locate(config: &ZonewatchConfig, point: Coordinate) -> Result<ProximitySummary> {
    point
        .validate()
        .with_context(|| format!("Invalid coordinate {}", point))?;

    let registry = ZoneRegistry::with_zones(config.zones.iter().cloned());
    Ok(summarize(point, &registry.snapshot()))
}

/// Print which configured zones contain `point` and the closest one that doesn't
pub fn handle_nearest(config: &ZonewatchConfig, point: Coordinate) -> Result<()> {
    let summary = locate(config, point)?;
    info!(
        "{} is inside {} of {} zones",
        point,
        summary.inside.len(),
        config.zones.len()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, &summary)?;
    out.write_all(b"\n")?;
    Ok(())
}
