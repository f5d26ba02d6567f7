//! Configuration for every component. Each section defaults independently, so
//! an empty TOML document is a valid configuration.

mod alert_config;
pub mod defaults;
mod detector_config;
mod logger_config;
mod metrics_config;
mod observability_config;
mod review_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use alert_config::AlertConfig;
pub use detector_config::{CombinedThresholds, DetectorConfig, SignalWeights, SingleSignalThresholds};
pub use logger_config::LoggerConfig;
pub use metrics_config::MetricsConfig;
pub use observability_config::ObservabilityConfig;
pub use review_config::ReviewConfig;
pub use storage_config::StorageConfig;

use crate::errors::ConfigError;

/// Environment variable overriding `storage.dir`.
pub const ENV_STORE_DIR: &str = "VIGIL_STORE_DIR";
/// Environment variable overriding `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "VIGIL_LOG_LEVEL";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
    pub alerts: AlertConfig,
    pub logger: LoggerConfig,
    pub detector: DetectorConfig,
    pub review: ReviewConfig,
    pub observability: ObservabilityConfig,
}

impl VigilConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `VIGIL_STORE_DIR` and `VIGIL_LOG_LEVEL` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_env(ENV_STORE_DIR) {
            self.storage.dir = dir;
        }
        if let Some(level) = non_empty_env(ENV_LOG_LEVEL) {
            self.observability.log_level = level;
        }
    }

    /// Reject values that would make a component misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector.validate()?;
        if self.metrics.window_max_events == 0 {
            return Err(invalid("metrics.window_max_events", "must be at least 1"));
        }
        if self.metrics.qps_window_secs == 0 {
            return Err(invalid("metrics.qps_window_secs", "must be at least 1"));
        }
        if self.storage.write_queue_capacity == 0 {
            return Err(invalid("storage.write_queue_capacity", "must be at least 1"));
        }
        if self.storage.segment_max_bytes == 0 {
            return Err(invalid("storage.segment_max_bytes", "must be at least 1"));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, &format!("{value} is outside [0, 1]")))
    }
}

pub(crate) fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
