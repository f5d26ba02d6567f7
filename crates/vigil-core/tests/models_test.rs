use std::str::FromStr;

use chrono::Utc;
use vigil_core::models::*;

fn event(stage: Stage, metadata: StageMetadata) -> EventRecord {
    EventRecord {
        event_id: "evt-1".into(),
        session_id: "sess-1".into(),
        stage,
        sequence: 0,
        capture_seq: 1,
        timestamp: Utc::now(),
        content_hash: Some(ContentHash::of("what is metformin?")),
        latency_ms: 12,
        query_event_id: None,
        metadata,
    }
}

#[test]
fn stage_parses_known_names_case_insensitively() {
    assert_eq!(Stage::from_str("query").unwrap(), Stage::Query);
    assert_eq!(Stage::from_str(" LLM ").unwrap(), Stage::Llm);
    for stage in Stage::ALL {
        assert_eq!(Stage::from_str(stage.as_str()).unwrap(), stage);
    }
}

#[test]
fn stage_rejects_unknown_name_with_validation_error() {
    let err = Stage::from_str("embedding").unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn pipeline_rank_orders_request_stages() {
    assert!(Stage::Query.pipeline_rank() < Stage::Retrieval.pipeline_rank());
    assert!(Stage::Retrieval.pipeline_rank() < Stage::Llm.pipeline_rank());
    assert!(Stage::Llm.pipeline_rank() < Stage::Response.pipeline_rank());
    assert_eq!(Stage::Error.pipeline_rank(), None);
}

#[test]
fn risk_levels_are_ordered() {
    assert!(RiskLevel::Low < RiskLevel::Medium);
    assert!(RiskLevel::Medium < RiskLevel::High);
    assert!(RiskLevel::High < RiskLevel::Critical);
}

#[test]
fn query_metadata_hashes_client_attributes() {
    let client = ClientInfo {
        ip: Some("10.0.0.7".into()),
        user_agent: Some("Mozilla/5.0".into()),
    };
    let meta = StageMetadata::query(&client);
    let json = serde_json::to_string(&meta).unwrap();
    assert!(!json.contains("10.0.0.7"));
    assert!(!json.contains("Mozilla"));
    match meta {
        StageMetadata::Query { client_ip_hash, .. } => {
            assert!(client_ip_hash.unwrap().matches("10.0.0.7"));
        }
        other => panic!("unexpected metadata {other:?}"),
    }
}

#[test]
fn metadata_reports_its_stage() {
    assert_eq!(StageMetadata::security("purge", "x").stage(), Stage::Security);
    assert_eq!(StageMetadata::retrieval("hybrid", &[0.2, 0.9]).stage(), Stage::Retrieval);
}

#[test]
fn retrieval_metadata_tracks_top_relevance() {
    match StageMetadata::retrieval("vector", &[0.3, 0.8, 0.5]) {
        StageMetadata::Retrieval {
            chunk_count,
            top_relevance,
            ..
        } => {
            assert_eq!(chunk_count, 3);
            assert_eq!(top_relevance, Some(0.8));
        }
        other => panic!("unexpected metadata {other:?}"),
    }
}

#[test]
fn stored_entry_serializes_with_tags() {
    let entry = StoredEntry::Event(event(
        Stage::Llm,
        StageMetadata::Llm {
            model_id: "med-llm-7b".into(),
            prompt_tokens: 512,
            completion_tokens: 128,
            confidence: 0.82,
        },
    ));
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["entry"], "event");
    assert_eq!(json["metadata"]["kind"], "llm");
    let back: StoredEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
    assert_eq!(back.entry_id(), "evt-1");
    assert_eq!(back.kind(), EntryKind::Event);
}

#[test]
fn signal_scores_spread_is_zero_when_uniform() {
    let scores = SignalScores {
        confidence: 0.4,
        source_consistency: 0.4,
        contradiction: 0.4,
        terminology: 0.4,
    };
    assert!(scores.spread().abs() < 1e-12);
    assert_eq!(scores.as_map().len(), 4);
}

#[test]
fn signal_scores_set_clamps() {
    let mut scores = SignalScores::default();
    scores.set(Signal::Contradiction, 1.7);
    scores.set(Signal::Terminology, -0.2);
    assert_eq!(scores.contradiction, 1.0);
    assert_eq!(scores.terminology, 0.0);
}

#[test]
fn review_state_terminal_kinds() {
    assert!(!ReviewStateKind::Pending.is_terminal());
    assert!(!ReviewStateKind::Claimed.is_terminal());
    assert!(ReviewStateKind::Approved.is_terminal());
    assert!(ReviewStateKind::Rejected.is_terminal());
    assert!(ReviewStateKind::Corrected.is_terminal());
    assert_eq!(ReviewStateKind::from(Decision::Correct), ReviewStateKind::Corrected);
}
