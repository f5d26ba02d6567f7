use std::sync::{Arc, Barrier};
use std::thread;

use test_fixtures::builders::{assessment, flagged};
use test_fixtures::sinks::{FailingSink, RecordingSink};
use vigil_core::config::ReviewConfig;
use vigil_core::errors::{ReviewError, VigilError};
use vigil_core::models::{Decision, ReviewStateKind, RiskLevel, SignalScores, StoredEntry};
use vigil_review::{ReleaseActor, ReviewQueue};

fn queue() -> ReviewQueue {
    ReviewQueue::new(&ReviewConfig::default())
}

fn review_err(result: Result<impl std::fmt::Debug, VigilError>) -> ReviewError {
    match result {
        Err(VigilError::ReviewError(e)) => e,
        other => panic!("expected a review error, got {other:?}"),
    }
}

#[test]
fn only_flagged_assessments_are_queued() {
    let q = queue();
    let a = assessment(RiskLevel::Low, false, SignalScores::default());
    assert!(matches!(review_err(q.enqueue(&a)), ReviewError::NotFlagged { .. }));
    assert!(q.is_empty());
}

#[test]
fn duplicate_assessment_is_rejected() {
    let q = queue();
    let a = flagged(RiskLevel::High);
    let first = q.enqueue(&a).unwrap();
    match review_err(q.enqueue(&a)) {
        ReviewError::Duplicate { item_id, .. } => assert_eq!(item_id, first),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(q.len(), 1);
    assert_eq!(q.get_by_assessment(&a.assessment_id).unwrap().item_id, first);
}

#[test]
fn pending_is_ordered_by_tier_then_fifo() {
    let q = queue();
    let medium = q.enqueue(&flagged(RiskLevel::Medium)).unwrap();
    let high_1 = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    let critical = q.enqueue(&flagged(RiskLevel::Critical)).unwrap();
    let high_2 = q.enqueue(&flagged(RiskLevel::High)).unwrap();

    let order: Vec<String> = q.list_pending(10).into_iter().map(|i| i.item_id).collect();
    assert_eq!(order, vec![critical, high_1, high_2, medium]);
    assert_eq!(q.list_pending(2).len(), 2);
}

#[test]
fn claim_decide_lifecycle() {
    let sink = Arc::new(RecordingSink::new());
    let q = queue().with_sink(sink.clone());
    let id = q.enqueue(&flagged(RiskLevel::Critical)).unwrap();

    let claimed = q.claim(&id, "dr-lee").unwrap();
    assert_eq!(claimed.state_kind(), ReviewStateKind::Claimed);
    assert_eq!(claimed.reviewer_id(), Some("dr-lee"));

    let done = q.decide(&id, "dr-lee", Decision::Reject, "cites no source").unwrap();
    assert_eq!(done.state_kind(), ReviewStateKind::Rejected);
    assert_eq!(done.decision_notes(), Some("cites no source"));
    assert!(done.decided_at().is_some());
    assert_eq!(done.revision, 2);
    assert_eq!(done.history.len(), 2);

    // creation and terminal decision persisted
    let revisions: Vec<u32> = sink
        .entries()
        .iter()
        .map(|e| match e {
            StoredEntry::Review(item) => item.revision,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(revisions, vec![0, 2]);

    assert_eq!(q.list_terminal(10).len(), 1);
    assert!(q.list_pending(10).is_empty());
}

#[test]
fn second_claim_reports_holder() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.claim(&id, "r1").unwrap();
    match review_err(q.claim(&id, "r2")) {
        ReviewError::AlreadyClaimed { holder, .. } => assert_eq!(holder, "r1"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn non_claimant_cannot_decide() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.claim(&id, "r1").unwrap();
    assert!(matches!(
        review_err(q.decide(&id, "r2", Decision::Approve, "")),
        ReviewError::Unauthorized { .. }
    ));
    assert_eq!(q.get(&id).unwrap().state_kind(), ReviewStateKind::Claimed);
}

#[test]
fn decide_before_claim_is_invalid() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    assert!(matches!(
        review_err(q.decide(&id, "r1", Decision::Approve, "")),
        ReviewError::InvalidTransition { .. }
    ));
}

#[test]
fn terminal_items_cannot_be_reclaimed() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.claim(&id, "r1").unwrap();
    q.decide(&id, "r1", Decision::Approve, "").unwrap();
    assert!(matches!(review_err(q.claim(&id, "r2")), ReviewError::InvalidTransition { .. }));
}

#[test]
fn correction_requires_notes() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.claim(&id, "r1").unwrap();
    assert!(q.decide(&id, "r1", Decision::Correct, "  ").unwrap_err().is_validation());
    let item = q.decide(&id, "r1", Decision::Correct, "max dose is 2 g").unwrap();
    assert_eq!(item.state_kind(), ReviewStateKind::Corrected);
}

#[test]
fn release_by_claimant_and_admin() {
    let config = ReviewConfig {
        admin_override_enabled: true,
        admin_ids: vec!["chief".into()],
    };
    let q = ReviewQueue::new(&config);
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();

    q.claim(&id, "r1").unwrap();
    assert!(matches!(
        review_err(q.release(&id, &ReleaseActor::Reviewer("r2".into()))),
        ReviewError::Unauthorized { .. }
    ));
    let released = q.release(&id, &ReleaseActor::Reviewer("r1".into())).unwrap();
    assert_eq!(released.state_kind(), ReviewStateKind::Pending);

    q.claim(&id, "r2").unwrap();
    assert!(q.release(&id, &ReleaseActor::Admin("intern".into())).is_err());
    q.release(&id, &ReleaseActor::Admin("chief".into())).unwrap();
    assert_eq!(q.get(&id).unwrap().history.last().unwrap().actor, "admin:chief");

    assert!(matches!(
        review_err(q.release(&id, &ReleaseActor::Reviewer("r2".into()))),
        ReviewError::InvalidTransition { .. }
    ));
}

#[test]
fn claim_next_takes_highest_priority() {
    let q = queue();
    q.enqueue(&flagged(RiskLevel::Medium)).unwrap();
    let critical = q.enqueue(&flagged(RiskLevel::Critical)).unwrap();

    let first = q.claim_next("r1").unwrap().unwrap();
    assert_eq!(first.item_id, critical);
    let second = q.claim_next("r2").unwrap().unwrap();
    assert_eq!(second.priority.tier, RiskLevel::Medium);
    assert!(q.claim_next("r3").unwrap().is_none());
}

#[test]
fn unknown_item_is_not_found() {
    assert!(matches!(review_err(queue().claim("nope", "r1")), ReviewError::NotFound { .. }));
}

#[test]
fn empty_reviewer_is_rejected() {
    let q = queue();
    let id = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    assert!(q.claim(&id, " ").unwrap_err().is_validation());
}

#[test]
fn two_concurrent_reviewers_exactly_one_claims() {
    for _ in 0..50 {
        let q = Arc::new(queue());
        let id = q.enqueue(&flagged(RiskLevel::Critical)).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["r1", "r2"]
            .into_iter()
            .map(|reviewer| {
                let q = Arc::clone(&q);
                let id = id.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    q.claim(&id, reviewer)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results.into_iter().find_map(|r| r.err()).unwrap();
        assert!(matches!(loser, VigilError::ReviewError(ReviewError::AlreadyClaimed { .. })));
    }
}

#[test]
fn persist_failure_does_not_fail_enqueue() {
    let q = queue().with_sink(Arc::new(FailingSink::default()));
    assert!(q.enqueue(&flagged(RiskLevel::High)).is_ok());
    assert_eq!(q.stats().persist_failures, 1);
    assert_eq!(q.stats().pending, 1);
}

#[test]
fn counts_by_state() {
    let q = queue();
    let a = q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.enqueue(&flagged(RiskLevel::High)).unwrap();
    q.claim(&a, "r1").unwrap();
    let counts = q.counts_by_state();
    assert_eq!(counts.get(&ReviewStateKind::Pending), Some(&1));
    assert_eq!(counts.get(&ReviewStateKind::Claimed), Some(&1));
}
