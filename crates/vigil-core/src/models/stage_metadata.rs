use serde::{Deserialize, Serialize};

use super::{ClientInfo, ContentHash, Stage};

/// Stage-specific attributes of an event, one fixed schema per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageMetadata {
    Query {
        client_ip_hash: Option<ContentHash>,
        user_agent_hash: Option<ContentHash>,
    },
    Retrieval {
        search_method: String,
        chunk_count: usize,
        top_relevance: Option<f64>,
    },
    Llm {
        model_id: String,
        prompt_tokens: u32,
        completion_tokens: u32,
        confidence: f64,
    },
    Response {
        http_status: u16,
    },
    Security {
        action: String,
        detail: String,
    },
    Error {
        error_kind: String,
        component: String,
        http_status: Option<u16>,
    },
}

impl StageMetadata {
    /// Query metadata. Client IP and user agent are hashed here, on entry.
    pub fn query(client: &ClientInfo) -> Self {
        Self::Query {
            client_ip_hash: client.ip.as_deref().map(ContentHash::of),
            user_agent_hash: client.user_agent.as_deref().map(ContentHash::of),
        }
    }

    pub fn retrieval(search_method: impl Into<String>, scores: &[f64]) -> Self {
        Self::Retrieval {
            search_method: search_method.into(),
            chunk_count: scores.len(),
            top_relevance: scores.iter().copied().reduce(f64::max),
        }
    }

    pub fn security(action: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Security {
            action: action.into(),
            detail: detail.into(),
        }
    }

    /// The stage this schema belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Query { .. } => Stage::Query,
            Self::Retrieval { .. } => Stage::Retrieval,
            Self::Llm { .. } => Stage::Llm,
            Self::Response { .. } => Stage::Response,
            Self::Security { .. } => Stage::Security,
            Self::Error { .. } => Stage::Error,
        }
    }

    /// Generation confidence carried by `llm` metadata.
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Llm { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }
}
