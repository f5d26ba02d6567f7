use serde::{Deserialize, Serialize};

use super::defaults;

/// Thresholds for snapshot-derived alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Rate alerts stay quiet below this many requests in the window.
    pub min_requests: u64,
    pub error_rate_warning: f64,
    pub error_rate_critical: f64,
    pub flag_rate_warning: f64,
    pub flag_rate_critical: f64,
    pub p95_latency_warning_ms: u64,
    pub p95_latency_critical_ms: u64,
    pub lost_events_warning: u64,
    pub lost_events_critical: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_requests: defaults::DEFAULT_ALERT_MIN_REQUESTS,
            error_rate_warning: defaults::DEFAULT_ERROR_RATE_WARNING,
            error_rate_critical: defaults::DEFAULT_ERROR_RATE_CRITICAL,
            flag_rate_warning: defaults::DEFAULT_FLAG_RATE_WARNING,
            flag_rate_critical: defaults::DEFAULT_FLAG_RATE_CRITICAL,
            p95_latency_warning_ms: defaults::DEFAULT_P95_LATENCY_WARNING_MS,
            p95_latency_critical_ms: defaults::DEFAULT_P95_LATENCY_CRITICAL_MS,
            lost_events_warning: defaults::DEFAULT_LOST_EVENTS_WARNING,
            lost_events_critical: defaults::DEFAULT_LOST_EVENTS_CRITICAL,
        }
    }
}
