use chrono::Utc;
use vigil_core::config::AlertConfig;
use vigil_core::models::{LatencyPercentiles, MetricSnapshot, Stage};
use vigil_observability::{evaluate_metric_alerts, AlertLevel, AlertMetric};

fn snapshot() -> MetricSnapshot {
    MetricSnapshot {
        taken_at: Utc::now(),
        window_events: 0,
        total_requests: 100,
        success_count: 100,
        error_count: 0,
        error_rate: 0.0,
        stage_counts: Default::default(),
        latency: Default::default(),
        qps: 1.0,
        mean_confidence: None,
        assessed_count: 100,
        flagged_count: 0,
        flag_rate: 0.0,
        total_recorded: 0,
        lost_events: 0,
    }
}

#[test]
fn quiet_snapshot_raises_nothing() {
    assert!(evaluate_metric_alerts(&snapshot(), &AlertConfig::default()).is_empty());
}

#[test]
fn error_rate_levels() {
    let config = AlertConfig::default();
    let mut snap = snapshot();
    snap.error_rate = 0.07;
    let alerts = evaluate_metric_alerts(&snap, &config);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, AlertMetric::ErrorRate);
    assert_eq!(alerts[0].level, AlertLevel::Warning);

    snap.error_rate = 0.25;
    let alerts = evaluate_metric_alerts(&snap, &config);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
    assert_eq!(alerts[0].threshold, config.error_rate_critical);
}

#[test]
fn rate_alerts_need_enough_requests() {
    let mut snap = snapshot();
    snap.total_requests = 3;
    snap.error_rate = 1.0;
    snap.assessed_count = 2;
    snap.flag_rate = 1.0;
    assert!(evaluate_metric_alerts(&snap, &AlertConfig::default()).is_empty());
}

#[test]
fn flag_rate_and_latency_alerts() {
    let mut snap = snapshot();
    snap.flag_rate = 0.5;
    snap.latency.insert(
        Stage::Response,
        LatencyPercentiles {
            count: 10,
            p50_ms: 900,
            p95_ms: 6_000,
            p99_ms: 9_000,
            max_ms: 9_500,
        },
    );
    let alerts = evaluate_metric_alerts(&snap, &AlertConfig::default());
    let flag = alerts.iter().find(|a| a.metric == AlertMetric::FlagRate).unwrap();
    assert_eq!(flag.level, AlertLevel::Critical);
    let latency = alerts.iter().find(|a| a.metric == AlertMetric::P95Latency).unwrap();
    assert_eq!(latency.level, AlertLevel::Warning);
}

#[test]
fn any_lost_event_warns() {
    let mut snap = snapshot();
    snap.lost_events = 1;
    let alerts = evaluate_metric_alerts(&snap, &AlertConfig::default());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, AlertMetric::LostEvents);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
}

#[test]
fn evaluation_itself_logs_nothing() {
    let mut snap = snapshot();
    snap.error_rate = 0.5;
    snap.lost_events = 5;
    let (alerts, logged) = test_fixtures::traces::count_events("metric_alert", || {
        evaluate_metric_alerts(&snap, &AlertConfig::default())
    });
    assert_eq!(alerts.len(), 2);
    assert_eq!(logged, 0);
}
