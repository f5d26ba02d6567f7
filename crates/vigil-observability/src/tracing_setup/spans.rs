//! Span definitions per operation: record, assess, review, history.

use vigil_core::models::ContentHash;

/// How a session appears in logs: its BLAKE3 hash, never the raw id.
pub fn session_hash(session_id: &str) -> ContentHash {
    ContentHash::of(session_id)
}

/// Span around one event-logger call.
#[macro_export]
macro_rules! record_span {
    ($stage:expr, $session:expr) => {
        tracing::debug_span!(
            "vigil.record",
            stage = %$stage,
            session_hash = %$crate::tracing_setup::spans::session_hash($session)
        )
    };
}

/// Span around one hallucination assessment.
#[macro_export]
macro_rules! assess_span {
    ($response_event_id:expr) => {
        tracing::info_span!("vigil.assess", response_event_id = %$response_event_id)
    };
}

/// Span around a reviewer action.
#[macro_export]
macro_rules! review_span {
    ($action:expr, $item_id:expr) => {
        tracing::info_span!("vigil.review", action = %$action, item_id = %$item_id)
    };
}

/// Span around a dashboard history read.
#[macro_export]
macro_rules! history_span {
    ($limit:expr) => {
        tracing::debug_span!("vigil.history", limit = $limit)
    };
}

pub mod names {
    pub const RECORD: &str = "vigil.record";
    pub const ASSESS: &str = "vigil.assess";
    pub const REVIEW: &str = "vigil.review";
    pub const HISTORY: &str = "vigil.history";
}
