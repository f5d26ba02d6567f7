use vigil_core::models::{Stage, StageMetadata};

/// One event as handed to [`EventLogger::record`](crate::EventLogger::record).
///
/// `payload` is the raw query or answer text. It is hashed and then dropped;
/// it is never copied into the record.
#[derive(Debug, Clone)]
pub struct EventInput<'a> {
    pub stage: Stage,
    pub session_id: &'a str,
    pub payload: Option<&'a str>,
    pub latency_ms: u64,
    pub metadata: StageMetadata,
}

impl<'a> EventInput<'a> {
    pub fn new(stage: Stage, session_id: &'a str, metadata: StageMetadata) -> Self {
        Self {
            stage,
            session_id,
            payload: None,
            latency_ms: 0,
            metadata,
        }
    }

    pub fn with_payload(mut self, payload: &'a str) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}
