use vigil_core::errors::VigilResult;
use vigil_core::models::{ClientInfo, EventRecord, GenerationOutput, RetrievalOutput, Stage, StageMetadata};

use crate::input::EventInput;
use crate::logger::EventLogger;

/// Records the stages of one session from collaborator outputs.
#[derive(Clone, Copy)]
pub struct SessionRecorder<'a> {
    logger: &'a EventLogger,
    session_id: &'a str,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(logger: &'a EventLogger, session_id: &'a str) -> Self {
        Self { logger, session_id }
    }

    pub fn session_id(&self) -> &str {
        self.session_id
    }

    /// The raw query is hashed; client attributes are hashed by the metadata
    /// constructor.
    pub fn query(&self, raw_query: &str, client: &ClientInfo) -> VigilResult<String> {
        self.logger.record(
            EventInput::new(Stage::Query, self.session_id, StageMetadata::query(client))
                .with_payload(raw_query),
        )
    }

    pub fn retrieval(&self, output: &RetrievalOutput) -> VigilResult<String> {
        let scores: Vec<f64> = output.chunks.iter().map(|c| c.relevance_score).collect();
        self.logger.record(
            EventInput::new(
                Stage::Retrieval,
                self.session_id,
                StageMetadata::retrieval(output.search_method.as_str(), &scores),
            )
            .with_latency(output.latency_ms),
        )
    }

    pub fn llm(&self, output: &GenerationOutput) -> VigilResult<String> {
        self.logger.record(
            EventInput::new(
                Stage::Llm,
                self.session_id,
                StageMetadata::Llm {
                    model_id: output.model_id.clone(),
                    prompt_tokens: output.prompt_tokens,
                    completion_tokens: output.completion_tokens,
                    confidence: output.confidence,
                },
            )
            .with_latency(output.latency_ms),
        )
    }

    /// The answer is hashed so the detector can later verify it.
    pub fn response(&self, answer: &str, http_status: u16, latency_ms: u64) -> VigilResult<String> {
        self.response_record(answer, http_status, latency_ms)
            .map(|record| record.event_id)
    }

    /// The recorded `response` event, ready to hand to the detector.
    pub fn response_record(&self, answer: &str, http_status: u16, latency_ms: u64) -> VigilResult<EventRecord> {
        self.logger.record_event(
            EventInput::new(Stage::Response, self.session_id, StageMetadata::Response { http_status })
                .with_payload(answer)
                .with_latency(latency_ms),
        )
    }

    pub fn error(&self, error_kind: &str, component: &str, http_status: Option<u16>) -> VigilResult<String> {
        self.logger.record(EventInput::new(
            Stage::Error,
            self.session_id,
            StageMetadata::Error {
                error_kind: error_kind.to_string(),
                component: component.to_string(),
                http_status,
            },
        ))
    }

    pub fn security(&self, action: &str, detail: &str) -> VigilResult<String> {
        self.logger.record(EventInput::new(
            Stage::Security,
            self.session_id,
            StageMetadata::security(action, detail),
        ))
    }
}
