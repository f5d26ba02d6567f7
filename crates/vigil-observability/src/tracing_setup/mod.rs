//! Tracing setup: structured JSON logging, span macros and event helpers.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;
use vigil_core::config::ObservabilityConfig;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "VIGIL_LOG";

/// Initialize from config. `VIGIL_LOG` still wins over `log_level`.
pub fn init_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let _ = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
