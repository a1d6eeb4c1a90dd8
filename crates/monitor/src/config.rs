//! Monitor configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `monitor.toml`, then `FATIGUE__*` environment variables
//! (`FATIGUE__FATIGUE__LATCH_WARNING=false`, `FATIGUE__TICK_MS=33`, ...).

use alerting::AlertConfig;
use config::{Config, Environment, File};
use fatigue::FatigueConfig;
use serde::{Deserialize, Serialize};
use signal_validator::ValidationConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::MonitorError;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FATIGUE_MONITOR_CONFIG";

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "monitor";

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Frame loop period (milliseconds)
    pub tick_ms: u64,
    /// JSON-lines file of recorded frame signals
    pub replay_path: Option<PathBuf>,
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Prometheus listener address, disabled when unset
    pub metrics_addr: Option<SocketAddr>,
    /// Period of the status log line (seconds, 0 disables)
    pub status_interval_secs: u64,
    pub fatigue: FatigueConfig,
    pub validation: ValidationConfig,
    pub alert: AlertConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            replay_path: None,
            log_level: "info".to_string(),
            log_json: false,
            metrics_addr: None,
            status_interval_secs: 10,
            fatigue: FatigueConfig::default(),
            validation: ValidationConfig::default(),
            alert: AlertConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, MonitorError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) and the environment
    pub fn load_from(path: &str) -> Result<Self, MonitorError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FATIGUE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MonitorConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.tick_ms == 0 {
            return Err(MonitorError::InvalidConfig("tick_ms must be at least 1".into()));
        }
        self.fatigue.validate()?;
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn status_interval(&self) -> Option<Duration> {
        (self.status_interval_secs > 0).then(|| Duration::from_secs(self.status_interval_secs))
    }
}
