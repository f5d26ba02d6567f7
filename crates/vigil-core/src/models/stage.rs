use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::VigilError;

/// Lifecycle stage of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Query,
    Retrieval,
    Llm,
    Response,
    Security,
    Error,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Query,
        Stage::Retrieval,
        Stage::Llm,
        Stage::Response,
        Stage::Security,
        Stage::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Query => "query",
            Stage::Retrieval => "retrieval",
            Stage::Llm => "llm",
            Stage::Response => "response",
            Stage::Security => "security",
            Stage::Error => "error",
        }
    }

    /// Position in the request pipeline, `None` for out-of-band stages.
    pub fn pipeline_rank(&self) -> Option<u8> {
        match self {
            Stage::Query => Some(0),
            Stage::Retrieval => Some(1),
            Stage::Llm => Some(2),
            Stage::Response => Some(3),
            Stage::Security | Stage::Error => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VigilError::validation(format!("unrecognized stage: {s:?}")))
    }
}
