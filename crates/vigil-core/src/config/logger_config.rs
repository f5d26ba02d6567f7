use serde::{Deserialize, Serialize};

use super::defaults;

/// Event logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Session state idle longer than this is purged.
    pub session_idle_secs: u64,
    /// How often idle sessions are swept. 0 disables the sweeper.
    pub session_sweep_interval_secs: u64,
    /// Recent fallback-channel entries kept for inspection.
    pub fallback_ring_capacity: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            session_idle_secs: defaults::DEFAULT_SESSION_IDLE_SECS,
            session_sweep_interval_secs: defaults::DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            fallback_ring_capacity: defaults::DEFAULT_FALLBACK_RING_CAPACITY,
        }
    }
}
