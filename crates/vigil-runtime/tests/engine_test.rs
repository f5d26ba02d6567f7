use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use vigil_core::config::VigilConfig;
use vigil_core::errors::VigilError;
use vigil_core::models::{
    ClientInfo, EntryKind, GenerationOutput, RetrievalOutput, RiskLevel, Stage, StoredEntry,
};
use vigil_observability::{AlertMetric, HealthStatus};
use vigil_runtime::{RecordFilter, TimeRange, VigilEngine};
use vigil_storage::{StaticKey, StoreKey};

fn open(dir: &TempDir) -> VigilEngine {
    let mut config = VigilConfig::default();
    config.storage.dir = dir.path().to_string_lossy().into_owned();
    VigilEngine::open_with_keys(config, Arc::new(StaticKey::new(StoreKey::generate()))).unwrap()
}

fn generation(answer: &str, confidence: f64) -> GenerationOutput {
    GenerationOutput {
        answer: answer.to_string(),
        confidence,
        prompt_tokens: 640,
        completion_tokens: 48,
        latency_ms: 820,
        model_id: "med-llm-7b".into(),
    }
}

#[test]
fn metformin_ckd_end_to_end() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);
    let scenario = test_fixtures::detector_scenario("metformin_ckd");

    let session = engine.session("sess-ckd");
    let client = ClientInfo {
        ip: Some("10.1.2.3".into()),
        user_agent: Some("clinic-portal/2.1".into()),
    };
    session.query("Can my father keep taking metformin with stage 4 CKD?", &client).unwrap();
    let retrieval = RetrievalOutput {
        chunks: scenario.chunks.clone(),
        latency_ms: 35,
        search_method: "hybrid".into(),
    };
    session.retrieval(&retrieval).unwrap();
    let output = generation(&scenario.answer, scenario.confidence);
    session.llm(&output).unwrap();

    let assessment = engine.respond("sess-ckd", &retrieval, &output, 200).unwrap();
    assert_eq!(assessment.risk_level, RiskLevel::Critical);
    assert!(assessment.flagged);

    let pending = engine.review().list_pending(10);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].assessment_id, assessment.assessment_id);
    assert_eq!(pending[0].priority.tier, RiskLevel::Critical);

    assert!(engine.flush(Duration::from_secs(10)));
    let page = engine
        .history(&RecordFilter::session("sess-ckd"), &TimeRange::all(), None, 50)
        .unwrap();
    let kinds: Vec<EntryKind> = page.items.iter().map(StoredEntry::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntryKind::Event,
            EntryKind::Event,
            EntryKind::Event,
            EntryKind::Event,
            EntryKind::Assessment,
            EntryKind::Review,
        ]
    );
    let stages: Vec<Stage> = page.items.iter().filter_map(StoredEntry::stage).collect();
    assert_eq!(stages, vec![Stage::Query, Stage::Retrieval, Stage::Llm, Stage::Response]);

    for entry in &page.items {
        let json = serde_json::to_string(entry).unwrap();
        assert!(!json.contains("advanced CKD"));
        assert!(!json.contains("stage 4 CKD"));
        assert!(!json.contains("10.1.2.3"));
    }

    let snap = engine.snapshot();
    assert_eq!(snap.total_requests, 1);
    assert_eq!(snap.success_count, 1);
    assert_eq!(snap.assessed_count, 1);
    assert_eq!(snap.flagged_count, 1);

    let health = engine.health();
    assert_eq!(health.component("review").unwrap().status, HealthStatus::Degraded);

    let report = engine.shutdown(Duration::from_secs(5));
    assert_eq!(report.lost, 0);
}

#[test]
fn reviewer_resolves_flagged_item() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);
    let session = engine.session("sess-r");
    session.query("q", &ClientInfo::default()).unwrap();
    let a = engine
        .respond(
            "sess-r",
            &RetrievalOutput::default(),
            &generation("Amoxicillin is a penicillin antibiotic.", 0.9),
            200,
        )
        .unwrap();
    assert!(a.flagged);

    let item = engine.review().claim_next("dr-okafor").unwrap().unwrap();
    assert_eq!(item.assessment_id, a.assessment_id);
    let done = engine
        .review()
        .decide(&item.item_id, "dr-okafor", vigil_core::models::Decision::Approve, "")
        .unwrap();
    assert!(done.is_terminal());
    assert_eq!(engine.health().overall, HealthStatus::Healthy);
    engine.shutdown(Duration::from_secs(5));
}

#[test]
fn snapshot_during_concurrent_burst_is_consistent() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(open(&dir));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let session = format!("burst-{i}");
                engine
                    .session(&session)
                    .query("what is the dose", &ClientInfo::default())
                    .unwrap();
            })
        })
        .collect();

    let mid = engine.snapshot();
    assert!(mid.total_recorded <= 100);
    assert_eq!(mid.stage_count(Stage::Query), mid.total_requests);

    for h in handles {
        h.join().unwrap();
    }
    let done = engine.snapshot();
    assert_eq!(done.total_recorded, 100);
    assert_eq!(done.total_requests, 100);
    assert!(done.total_recorded >= mid.total_recorded);
    engine.shutdown(Duration::from_secs(5));
}

#[test]
fn history_pages_through_results() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);
    let session = engine.session("audit");
    for i in 0..25 {
        session.security("login", &format!("attempt {i}")).unwrap();
    }
    assert!(engine.flush(Duration::from_secs(10)));

    let filter = RecordFilter::session("audit");
    let mut cursor: Option<String> = None;
    let mut seen = Vec::new();
    loop {
        let page = engine
            .history(&filter, &TimeRange::all(), cursor.as_deref(), 10)
            .unwrap();
        assert_eq!(page.total, 25);
        seen.extend(page.items.into_iter().map(|e| e.entry_id()));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen.len(), 25);

    let err = engine
        .history(&filter, &TimeRange::all(), Some("not-a-cursor"), 10)
        .unwrap_err();
    assert!(err.is_validation());
    engine.shutdown(Duration::from_secs(5));
}

#[test]
fn records_after_shutdown_are_counted_lost() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);
    engine.session("s").query("q", &ClientInfo::default()).unwrap();

    let report = engine.shutdown(Duration::from_secs(5));
    assert_eq!(report.lost, 0);

    // The answer path never fails on a closed write path.
    assert!(engine.session("s").security("late", "after shutdown").is_ok());
    assert_eq!(engine.logger().stats().sink_failures, 1);
    assert_eq!(engine.snapshot().lost_events, 1);

    let (alerts, logged) = test_fixtures::traces::count_events("metric_alert", || engine.alerts());
    assert!(alerts.iter().any(|a| a.metric == AlertMetric::LostEvents));
    assert_eq!(logged, alerts.len());

    let health = engine.health();
    assert_eq!(health.overall, HealthStatus::Unhealthy);
    assert_eq!(engine.shutdown(Duration::from_secs(1)).drained, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = VigilConfig::default();
    config.storage.dir = dir.path().to_string_lossy().into_owned();
    config.storage.write_queue_capacity = 0;
    let result = VigilEngine::open_with_keys(config, Arc::new(StaticKey::new(StoreKey::generate())));
    assert!(matches!(result, Err(VigilError::ConfigError(_))));
}

#[test]
fn invalid_assessment_input_is_rejected_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir);
    let session = engine.session("s");
    session.query("q", &ClientInfo::default()).unwrap();
    let response = session.response_record("the answer", 200, 5).unwrap();

    let err = engine
        .assess_response(&response, "a tampered answer", &[], 0.9)
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(engine.detector().stats().assessed, 0);
    assert!(engine.review().is_empty());
    engine.shutdown(Duration::from_secs(5));
}

#[test]
fn idle_sessions_are_swept_in_the_background() {
    let dir = TempDir::new().unwrap();
    let mut config = VigilConfig::default();
    config.storage.dir = dir.path().to_string_lossy().into_owned();
    config.logger.session_sweep_interval_secs = 1;
    config.logger.session_idle_secs = 0;
    let engine =
        VigilEngine::open_with_keys(config, Arc::new(StaticKey::new(StoreKey::generate()))).unwrap();

    engine.session("s-1").query("q1", &ClientInfo::default()).unwrap();
    engine.session("s-2").query("q2", &ClientInfo::default()).unwrap();
    assert_eq!(engine.logger().sessions().len(), 2);

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while !engine.logger().sessions().is_empty() && std::time::Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
    }
    assert!(engine.logger().sessions().is_empty());
    assert!(engine.degradation_alerts().is_empty());
    assert_eq!(engine.shutdown_default().lost, 0);
}
