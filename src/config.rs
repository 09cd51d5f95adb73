use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::signals::{Waypoint, WaypointRegistry};

/// Default distance at which a vehicle counts as having reached a signal
pub const ARRIVAL_DISTANCE_METERS: f64 = 50.0;

/// Default distance inside which approach alerts become eligible
pub const ALERT_DISTANCE_METERS: f64 = 800.0;

/// Thresholds used by the proximity processor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub arrival_distance_meters: f64,
    pub alert_distance_meters: f64,
    /// Fire at most one approach alert per tracked signal instead of one per closer report
    pub approach_alert_once: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            arrival_distance_meters: ARRIVAL_DISTANCE_METERS,
            alert_distance_meters: ALERT_DISTANCE_METERS,
            approach_alert_once: false,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("arrival_distance_meters", self.arrival_distance_meters),
            ("alert_distance_meters", self.alert_distance_meters),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be a positive number, got {}", name, value);
            }
        }
        if self.arrival_distance_meters > self.alert_distance_meters {
            bail!(
                "arrival_distance_meters ({}) must not exceed alert_distance_meters ({})",
                self.arrival_distance_meters,
                self.alert_distance_meters
            );
        }
        Ok(())
    }
}

/// Top-level config file structure
///
/// ```toml
/// [alerts]
/// arrival_distance_meters = 50.0
/// alert_distance_meters = 800.0
///
/// [[signals]]
/// id = 1
/// name = "Chakli Circle"
/// latitude = 22.308333
/// longitude = 73.165278
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Replaces the built-in signal table when non-empty
    #[serde(default)]
    pub signals: Vec<Waypoint>,
}

impl ConfigFile {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ConfigFile = toml::from_str(contents)?;
        config.alerts.validate()?;
        Ok(config)
    }

    /// Build the signal registry this config describes
    pub fn registry(&self) -> Result<WaypointRegistry> {
        if self.signals.is_empty() {
            return Ok(WaypointRegistry::builtin());
        }
        WaypointRegistry::new(self.signals.clone()).context("Invalid [[signals]] table")
    }
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `--config` flag
/// 2. `RAPIDROUTE_CONFIG` env var
/// 3. `./rapidroute.toml` if it exists
pub fn config_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    if flag.is_some() {
        return flag;
    }
    if let Ok(path) = std::env::var("RAPIDROUTE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from("./rapidroute.toml");
    local.exists().then_some(local)
}
