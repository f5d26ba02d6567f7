//! Structured log events emitted by the observability layer.
//!
//! Fields carry ids, counts and levels only. Never pass payload text here.

use crate::alerts::MetricAlert;

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn component_recovered(component: &str, degraded_secs: i64) {
    tracing::info!(
        event = "component_recovered",
        component = %component,
        degraded_secs = degraded_secs,
        "component recovered"
    );
}

pub fn alert_raised(alert: &MetricAlert) {
    tracing::warn!(
        event = "metric_alert",
        metric = ?alert.metric,
        level = ?alert.level,
        observed = alert.observed,
        threshold = alert.threshold,
        "metric threshold crossed"
    );
}

/// Storage reported new losses since the last sync.
pub fn events_lost(newly_lost: u64, total: u64) {
    tracing::error!(
        event = "events_lost",
        newly_lost = newly_lost,
        total = total,
        "durable write path dropped events"
    );
}
