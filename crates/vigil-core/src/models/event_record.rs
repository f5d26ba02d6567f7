use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentHash, Stage, StageMetadata};
use crate::constants::SYSTEM_SESSION_ID;

/// One captured lifecycle event. Never carries raw query or answer text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// UUID v4, write-once.
    pub event_id: String,
    pub session_id: String,
    pub stage: Stage,
    /// Position of this event within its session, assigned in call order.
    pub sequence: u32,
    /// Process-wide monotonic capture counter.
    pub capture_seq: u64,
    pub timestamp: DateTime<Utc>,
    pub content_hash: Option<ContentHash>,
    pub latency_ms: u64,
    /// The session's query event. Set on every non-query event of a session
    /// that has one; always set on `response` events.
    pub query_event_id: Option<String>,
    pub metadata: StageMetadata,
}

impl EventRecord {
    pub fn is_response(&self) -> bool {
        self.stage == Stage::Response
    }

    /// A `security` event the system emits about itself, under the reserved
    /// session. `capture_seq` is 0: these never pass through the logger.
    pub fn system_security(sequence: u32, action: &str, detail: String) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            session_id: SYSTEM_SESSION_ID.to_string(),
            stage: Stage::Security,
            sequence,
            capture_seq: 0,
            timestamp: Utc::now(),
            content_hash: None,
            latency_ms: 0,
            query_event_id: None,
            metadata: StageMetadata::security(action, detail),
        }
    }
}
