//! TOML configuration for the engine and the static zone list
//!
//! ```toml
//! [engine]
//! min_motion_interval_ms = 1000
//! session_idle_timeout_ms = 3600000
//!
//! [[zones]]
//! id = "depot"
//! shape = { type = "circle", center = { latitude = 48.85, longitude = 2.35 }, radius_meters = 250.0 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::motion::DEFAULT_MIN_INTERVAL_MS;
use crate::zones::Zone;

/// Environment variable naming the config file when no path is given
pub const CONFIG_ENV_VAR: &str = "ZONEWATCH_CONFIG";

fn default_min_motion_interval_ms() -> i64 {
    DEFAULT_MIN_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixes closer together than this are not used for speed estimates
    #[serde(default = "default_min_motion_interval_ms")]
    pub min_motion_interval_ms: i64,
    /// Device sessions without a fix for this long can be evicted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_idle_timeout_ms: Option<i64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_motion_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            session_idle_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_motion_interval_ms <= 0 {
            anyhow::bail!(
                "min_motion_interval_ms must be positive, got {}",
                self.min_motion_interval_ms
            );
        }
        if let Some(timeout) = self.session_idle_timeout_ms
            && timeout <= 0
        {
            anyhow::bail!("session_idle_timeout_ms must be positive, got {}", timeout);
        }
        Ok(())
    }
}

/// Whole config file: engine settings plus an optional static zone list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonewatchConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl ZonewatchConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ZonewatchConfig =
            toml::from_str(contents).context("Failed to parse zonewatch config")?;
        config.engine.validate()?;

        for zone in &config.zones {
            if let Err(e) = zone.validate() {
                // Kept anyway: the engine skips malformed zones per fix
                warn!("Zone {} in config has invalid geometry: {}", zone.id, e);
            }
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!(
            "Loaded config from {} ({} zones)",
            path.display(),
            config.zones.len()
        );
        Ok(config)
    }

    /// Load from `explicit`, else from `$ZONEWATCH_CONFIG`, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match path {
            Some(path) => Self::load(&path),
            None => {
                info!("No config file given, using defaults with no zones");
                Ok(Self::default())
            }
        }
    }
}
