use serde::{Deserialize, Serialize};

use super::defaults;

/// Rolling metrics window bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub window_max_events: usize,
    pub window_max_age_secs: u64,
    /// Width of the sliding QPS estimator, in one-second buckets.
    pub qps_window_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_max_events: defaults::DEFAULT_WINDOW_MAX_EVENTS,
            window_max_age_secs: defaults::DEFAULT_WINDOW_MAX_AGE_SECS,
            qps_window_secs: defaults::DEFAULT_QPS_WINDOW_SECS,
        }
    }
}
