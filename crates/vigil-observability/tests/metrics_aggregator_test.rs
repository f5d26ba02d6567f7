use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use test_fixtures::builders::{event, flagged, llm_event, session_chain, with_latency};
use vigil_core::config::MetricsConfig;
use vigil_core::models::{RiskLevel, Stage};
use vigil_core::traits::IEventObserver;
use vigil_observability::MetricsAggregator;

fn config(max_events: usize, max_age_secs: u64) -> MetricsConfig {
    MetricsConfig {
        window_max_events: max_events,
        window_max_age_secs: max_age_secs,
        qps_window_secs: 10,
    }
}

#[test]
fn empty_snapshot_is_all_zero() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    let snap = agg.snapshot();
    assert_eq!(snap.window_events, 0);
    assert_eq!(snap.total_requests, 0);
    assert_eq!(snap.error_rate, 0.0);
    assert_eq!(snap.flag_rate, 0.0);
    assert_eq!(snap.qps, 0.0);
    assert!(snap.mean_confidence.is_none());
    assert_eq!(snap.end_to_end().count, 0);
}

#[test]
fn counts_requests_successes_and_errors() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    for i in 0..4 {
        for record in session_chain(&format!("s{i}")) {
            agg.observe(&record).unwrap();
        }
    }
    agg.observe(&event("s9", Stage::Query, 0)).unwrap();
    agg.observe(&event("s9", Stage::Error, 1)).unwrap();

    let snap = agg.snapshot();
    assert_eq!(snap.total_requests, 5);
    assert_eq!(snap.success_count, 4);
    assert_eq!(snap.error_count, 1);
    assert!((snap.error_rate - 0.2).abs() < 1e-9);
    assert_eq!(snap.stage_count(Stage::Retrieval), 4);
    assert_eq!(snap.window_events, 18);
    assert_eq!(snap.total_recorded, 18);
}

#[test]
fn window_evicts_by_count() {
    let agg = MetricsAggregator::new(&config(5, 300));
    for i in 0..8 {
        agg.observe(&event("s", Stage::Query, i)).unwrap();
    }
    let snap = agg.snapshot();
    assert_eq!(snap.window_events, 5);
    assert_eq!(snap.stage_counts.values().sum::<u64>(), 5);
    assert_eq!(snap.total_recorded, 8);
}

#[test]
fn window_evicts_by_age() {
    let agg = MetricsAggregator::new(&config(100, 60));
    let t0 = Utc::now();
    agg.observe_at(&event("s", Stage::Query, 0), t0);
    agg.observe_at(&event("s", Stage::Error, 1), t0 + Duration::seconds(30));

    let snap = agg.snapshot_at(t0 + Duration::seconds(61));
    assert_eq!(snap.window_events, 1);
    assert_eq!(snap.total_requests, 0);
    assert_eq!(snap.error_count, 1);
    // No requests left, so the rate stays defined.
    assert_eq!(snap.error_rate, 0.0);
    assert_eq!(snap.total_recorded, 2);
}

#[test]
fn qps_uses_sliding_one_second_buckets() {
    let agg = MetricsAggregator::new(&config(1000, 300));
    let t0 = Utc::now();
    for _ in 0..20 {
        agg.observe_at(&event("s", Stage::Query, 0), t0);
    }
    assert!((agg.snapshot_at(t0).qps - 2.0).abs() < 1e-9);
    assert_eq!(agg.snapshot_at(t0 + Duration::seconds(11)).qps, 0.0);
}

#[test]
fn latency_percentiles_per_stage() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    for ms in 1..=100 {
        agg.observe(&with_latency(event("s", Stage::Response, 3), ms)).unwrap();
    }
    let p = agg.snapshot().end_to_end();
    assert_eq!(p.count, 100);
    assert_eq!(p.p50_ms, 51);
    assert_eq!(p.p95_ms, 95);
    assert_eq!(p.p99_ms, 99);
    assert_eq!(p.max_ms, 100);
}

#[test]
fn mean_confidence_comes_from_llm_events() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    agg.observe(&llm_event("a", 0.9)).unwrap();
    agg.observe(&llm_event("b", 0.5)).unwrap();
    agg.observe(&event("c", Stage::Query, 0)).unwrap();
    let mean = agg.snapshot().mean_confidence.unwrap();
    assert!((mean - 0.7).abs() < 1e-9);
}

#[test]
fn flag_rate_tracks_assessments() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    agg.observe_assessment(&flagged(RiskLevel::Critical)).unwrap();
    agg.observe_assessment_at(false, Utc::now());
    agg.observe_assessment_at(false, Utc::now());
    agg.observe_assessment_at(true, Utc::now());
    let snap = agg.snapshot();
    assert_eq!(snap.assessed_count, 4);
    assert_eq!(snap.flagged_count, 2);
    assert!((snap.flag_rate - 0.5).abs() < 1e-9);
}

#[test]
fn lost_events_never_decrease() {
    let agg = MetricsAggregator::new(&MetricsConfig::default());
    agg.record_lost(3);
    agg.set_lost_events(2);
    assert_eq!(agg.lost_events(), 3);
    agg.set_lost_events(10);
    assert_eq!(agg.snapshot().lost_events, 10);
}

#[test]
fn snapshot_mid_burst_is_consistent() {
    let agg = Arc::new(MetricsAggregator::new(&MetricsConfig::default()));

    let reader = {
        let agg = Arc::clone(&agg);
        thread::spawn(move || {
            for _ in 0..200 {
                let snap = agg.snapshot();
                let stage_sum: u64 = snap.stage_counts.values().sum();
                let latency_sum: u64 = snap.latency.values().map(|p| p.count).sum();
                assert_eq!(stage_sum, snap.window_events);
                assert_eq!(latency_sum, snap.window_events);
                assert_eq!(snap.total_recorded, snap.window_events);
                assert!(snap.window_events <= 100);
                assert!(snap.error_rate >= 0.0 && snap.error_rate <= 1.0);
            }
        })
    };

    let writers: Vec<_> = (0..100)
        .map(|i| {
            let agg = Arc::clone(&agg);
            thread::spawn(move || {
                let stage = if i % 2 == 0 { Stage::Query } else { Stage::Response };
                agg.observe(&event(&format!("s{i}"), stage, 0)).unwrap();
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    let snap = agg.snapshot();
    assert_eq!(snap.window_events, 100);
    assert_eq!(snap.total_requests, 50);
    assert_eq!(snap.success_count, 50);
    assert_eq!(snap.total_recorded, 100);
}

#[test]
fn late_sample_is_evicted_by_age() {
    let agg = MetricsAggregator::new(&config(100, 60));
    let t0 = Utc::now();
    agg.observe_at(&event("s", Stage::Error, 1), t0 + Duration::seconds(30));
    agg.observe_at(&event("s", Stage::Query, 0), t0);

    let snap = agg.snapshot_at(t0 + Duration::seconds(61));
    assert_eq!(snap.window_events, 1);
    assert_eq!(snap.total_requests, 0);
    assert_eq!(snap.error_count, 1);
}

#[test]
fn late_sample_is_the_first_evicted_by_count() {
    let agg = MetricsAggregator::new(&config(2, 600));
    let t0 = Utc::now();
    agg.observe_at(&event("s1", Stage::Query, 0), t0 + Duration::seconds(10));
    agg.observe_at(&event("s2", Stage::Query, 0), t0 + Duration::seconds(20));
    agg.observe_at(&event("s0", Stage::Error, 1), t0);

    let snap = agg.snapshot_at(t0 + Duration::seconds(21));
    assert_eq!(snap.window_events, 2);
    assert_eq!(snap.total_requests, 2);
    assert_eq!(snap.error_count, 0);
}
