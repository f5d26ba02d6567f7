use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use test_fixtures::builders::flagged;
use vigil_core::config::ReviewConfig;
use vigil_core::models::{ReviewStateKind, RiskLevel};
use vigil_review::ReviewQueue;

fn tier() -> impl Strategy<Value = RiskLevel> {
    prop_oneof![
        Just(RiskLevel::Medium),
        Just(RiskLevel::High),
        Just(RiskLevel::Critical),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn at_most_one_claimant(reviewers in 2usize..8) {
        let q = Arc::new(ReviewQueue::new(&ReviewConfig::default()));
        let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
        let barrier = Arc::new(Barrier::new(reviewers));

        let handles: Vec<_> = (0..reviewers)
            .map(|n| {
                let (q, id, barrier) = (Arc::clone(&q), id.clone(), Arc::clone(&barrier));
                thread::spawn(move || {
                    barrier.wait();
                    q.claim(&id, &format!("r{n}")).is_ok()
                })
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();

        prop_assert_eq!(wins, 1);
        prop_assert_eq!(q.get(&id).unwrap().state_kind(), ReviewStateKind::Claimed);
    }

    #[test]
    fn pending_order_is_tier_then_fifo(tiers in prop::collection::vec(tier(), 1..20)) {
        let q = ReviewQueue::new(&ReviewConfig::default());
        for t in &tiers {
            q.enqueue(&flagged(*t)).unwrap();
        }
        let pending = q.list_pending(usize::MAX);
        prop_assert_eq!(pending.len(), tiers.len());
        for pair in pending.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.priority.tier > b.priority.tier
                    || (a.priority.tier == b.priority.tier && a.enqueued_seq < b.enqueued_seq)
            );
        }
    }
}
