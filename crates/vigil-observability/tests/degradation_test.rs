use chrono::{Duration, Utc};
use vigil_observability::{evaluate_alerts, AlertLevel, DegradationTracker};

#[test]
fn enter_and_recover_closes_the_episode() {
    let mut tracker = DegradationTracker::new();
    assert!(tracker.enter("storage", "key revoked", "degraded_buffer"));
    assert!(tracker.is_degraded("storage"));
    assert_eq!(tracker.active().len(), 1);

    assert!(tracker.recover("storage"));
    assert!(!tracker.is_degraded("storage"));
    let episode = tracker.episodes("storage").next().unwrap();
    assert!(episode.ended_at.is_some());
    assert!(!tracker.recover("storage"));
}

#[test]
fn second_enter_while_open_is_ignored() {
    let mut tracker = DegradationTracker::new();
    assert!(tracker.enter("storage", "key revoked", "degraded_buffer"));
    assert!(!tracker.enter("storage", "key revoked", "degraded_buffer"));
    assert_eq!(tracker.episodes("storage").count(), 1);
}

#[test]
fn flapping_component_warns() {
    let mut tracker = DegradationTracker::new();
    for _ in 0..4 {
        tracker.enter("storage", "io", "retry");
        tracker.recover("storage");
    }
    let alerts = evaluate_alerts(&tracker);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Warning);
    assert_eq!(alerts[0].component, "storage");
}

#[test]
fn three_in_an_hour_is_fine() {
    let mut tracker = DegradationTracker::new();
    for _ in 0..3 {
        tracker.enter("logger", "sink", "fallback");
        tracker.recover("logger");
    }
    assert!(evaluate_alerts(&tracker).is_empty());
}

#[test]
fn stuck_component_is_critical() {
    let mut tracker = DegradationTracker::new();
    tracker.enter_at(
        "storage",
        "key revoked",
        "degraded_buffer",
        Utc::now() - Duration::hours(25),
    );
    let alerts = evaluate_alerts(&tracker);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Critical);
}
