use proptest::prelude::*;
use test_fixtures::builders::{event, with_latency};
use vigil_core::config::MetricsConfig;
use vigil_core::models::Stage;
use vigil_observability::aggregator::summarize;
use vigil_observability::MetricsAggregator;

fn stage_strategy() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

proptest! {
    #[test]
    fn percentiles_are_ordered(mut latencies in prop::collection::vec(0u64..60_000, 1..500)) {
        let p = summarize(&mut latencies);
        prop_assert!(p.p50_ms <= p.p95_ms);
        prop_assert!(p.p95_ms <= p.p99_ms);
        prop_assert!(p.p99_ms <= p.max_ms);
    }

    #[test]
    fn window_never_exceeds_bound(
        stages in prop::collection::vec(stage_strategy(), 0..200),
        max_events in 1usize..50,
    ) {
        let agg = MetricsAggregator::new(&MetricsConfig {
            window_max_events: max_events,
            ..MetricsConfig::default()
        });
        for (i, stage) in stages.iter().enumerate() {
            agg.observe_at(&with_latency(event("s", *stage, i as u32), i as u64), chrono::Utc::now());
        }
        let snap = agg.snapshot();
        prop_assert!(snap.window_events as usize <= max_events);
        prop_assert_eq!(snap.stage_counts.values().sum::<u64>(), snap.window_events);
        prop_assert_eq!(snap.total_recorded, stages.len() as u64);
        prop_assert!(snap.success_count <= snap.window_events);
    }
}
