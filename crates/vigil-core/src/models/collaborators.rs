//! Inputs handed over by the retrieval engine, the generation engine and the
//! API layer. Raw strings in these types live only for the duration of a call.

use serde::{Deserialize, Serialize};

/// One ranked chunk returned by the retrieval engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub content: String,
    pub relevance_score: f64,
}

impl RetrievedChunk {
    pub fn new(chunk_id: impl Into<String>, content: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            content: content.into(),
            relevance_score,
        }
    }
}

/// Everything the retrieval engine reports for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalOutput {
    pub chunks: Vec<RetrievedChunk>,
    pub latency_ms: u64,
    pub search_method: String,
}

/// Everything the generation engine reports for one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub answer: String,
    /// Model-reported confidence in [0, 1].
    pub confidence: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
    pub model_id: String,
}

/// Client attributes from the API layer, hashed immediately on entry.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
