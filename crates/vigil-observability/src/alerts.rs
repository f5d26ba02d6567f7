//! Threshold alerts over a [`MetricSnapshot`]. Delivery is the caller's job.

use serde::{Deserialize, Serialize};
use vigil_core::config::AlertConfig;
use vigil_core::models::MetricSnapshot;

use crate::degradation::AlertLevel;

/// Which snapshot metric crossed a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    ErrorRate,
    FlagRate,
    P95Latency,
    LostEvents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAlert {
    pub level: AlertLevel,
    pub metric: AlertMetric,
    pub observed: f64,
    pub threshold: f64,
    pub message: String,
}

/// Evaluate every threshold against `snapshot`. At most one alert per metric,
/// at the highest level crossed.
pub fn evaluate_metric_alerts(snapshot: &MetricSnapshot, config: &AlertConfig) -> Vec<MetricAlert> {
    let mut alerts = Vec::new();

    // Rates over a handful of requests are noise.
    if snapshot.total_requests >= config.min_requests {
        push_crossing(
            &mut alerts,
            AlertMetric::ErrorRate,
            snapshot.error_rate,
            config.error_rate_warning,
            config.error_rate_critical,
            "error rate",
        );
    }
    if snapshot.assessed_count >= config.min_requests {
        push_crossing(
            &mut alerts,
            AlertMetric::FlagRate,
            snapshot.flag_rate,
            config.flag_rate_warning,
            config.flag_rate_critical,
            "hallucination flag rate",
        );
    }

    let p95 = snapshot.end_to_end();
    if p95.count > 0 {
        push_crossing(
            &mut alerts,
            AlertMetric::P95Latency,
            p95.p95_ms as f64,
            config.p95_latency_warning_ms as f64,
            config.p95_latency_critical_ms as f64,
            "end-to-end p95 latency (ms)",
        );
    }

    push_crossing(
        &mut alerts,
        AlertMetric::LostEvents,
        snapshot.lost_events as f64,
        config.lost_events_warning as f64,
        config.lost_events_critical as f64,
        "lost events",
    );
    alerts
}

fn push_crossing(
    alerts: &mut Vec<MetricAlert>,
    metric: AlertMetric,
    observed: f64,
    warning: f64,
    critical: f64,
    label: &str,
) {
    let (level, threshold) = if observed >= critical {
        (AlertLevel::Critical, critical)
    } else if observed >= warning {
        (AlertLevel::Warning, warning)
    } else {
        return;
    };
    alerts.push(MetricAlert {
        level,
        metric,
        observed,
        threshold,
        message: format!("{label} at {observed:.3} crossed {threshold:.3}"),
    });
}
