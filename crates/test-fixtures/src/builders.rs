//! Builders for records that would otherwise need a full pipeline.

use chrono::Utc;
use vigil_core::models::*;

/// A well-formed event for `stage` with default metadata.
pub fn event(session_id: &str, stage: Stage, sequence: u32) -> EventRecord {
    EventRecord {
        event_id: uuid::Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        stage,
        sequence,
        capture_seq: sequence as u64,
        timestamp: Utc::now(),
        content_hash: None,
        latency_ms: 10,
        query_event_id: None,
        metadata: metadata_for(stage),
    }
}

/// Default metadata matching `stage`.
pub fn metadata_for(stage: Stage) -> StageMetadata {
    match stage {
        Stage::Query => StageMetadata::query(&ClientInfo::default()),
        Stage::Retrieval => StageMetadata::retrieval("hybrid", &[0.9, 0.7]),
        Stage::Llm => StageMetadata::Llm {
            model_id: "med-llm-7b".into(),
            prompt_tokens: 512,
            completion_tokens: 128,
            confidence: 0.8,
        },
        Stage::Response => StageMetadata::Response { http_status: 200 },
        Stage::Security => StageMetadata::security("test", "fixture"),
        Stage::Error => StageMetadata::Error {
            error_kind: "timeout".into(),
            component: "generation".into(),
            http_status: Some(504),
        },
    }
}

pub fn with_latency(mut record: EventRecord, latency_ms: u64) -> EventRecord {
    record.latency_ms = latency_ms;
    record
}

pub fn llm_event(session_id: &str, confidence: f64) -> EventRecord {
    let mut record = event(session_id, Stage::Llm, 2);
    record.metadata = StageMetadata::Llm {
        model_id: "med-llm-7b".into(),
        prompt_tokens: 512,
        completion_tokens: 128,
        confidence,
    };
    record
}

/// The full query → retrieval → llm → response chain of one session.
pub fn session_chain(session_id: &str) -> Vec<EventRecord> {
    let query = event(session_id, Stage::Query, 0);
    let query_id = query.event_id.clone();
    let mut chain = vec![query];
    for (seq, stage) in [Stage::Retrieval, Stage::Llm, Stage::Response]
        .into_iter()
        .enumerate()
    {
        let mut e = event(session_id, stage, seq as u32 + 1);
        e.query_event_id = Some(query_id.clone());
        chain.push(e);
    }
    chain
}

/// A response event whose content hash covers `answer`.
pub fn response_event(session_id: &str, answer: &str) -> EventRecord {
    let mut e = event(session_id, Stage::Response, 3);
    e.content_hash = Some(ContentHash::of(answer));
    e.query_event_id = Some(uuid::Uuid::new_v4().to_string());
    e
}

/// An assessment with the given level and scores.
pub fn assessment(risk_level: RiskLevel, flagged: bool, scores: SignalScores) -> HallucinationAssessment {
    HallucinationAssessment {
        assessment_id: uuid::Uuid::new_v4().to_string(),
        response_event_id: uuid::Uuid::new_v4().to_string(),
        session_id: format!("sess-{}", uuid::Uuid::new_v4().simple()),
        risk_level,
        signal_scores: scores,
        weighted_mean: 0.0,
        triggered_by: Vec::new(),
        findings: Vec::new(),
        flagged,
        created_at: Utc::now(),
    }
}

/// A flagged assessment at `risk_level` with uniform scores.
pub fn flagged(risk_level: RiskLevel) -> HallucinationAssessment {
    let s = match risk_level {
        RiskLevel::Low => 0.1,
        RiskLevel::Medium => 0.4,
        RiskLevel::High => 0.6,
        RiskLevel::Critical => 0.9,
    };
    assessment(
        risk_level,
        true,
        SignalScores {
            confidence: s,
            source_consistency: s,
            contradiction: s,
            terminology: s,
        },
    )
}
