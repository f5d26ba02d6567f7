//! Keyset cursor pagination: no OFFSET/LIMIT scans.
//! The key is the append position `(segment_id, frame_offset)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Position of the last entry on the previous page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    #[serde(rename = "s")]
    pub segment_id: i64,
    #[serde(rename = "o")]
    pub frame_offset: u64,
}

impl PaginationCursor {
    /// Encode as opaque base64 JSON.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode an opaque cursor. `None` if it was not produced by [`encode`](Self::encode).
    pub fn decode(encoded: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(encoded.trim()).ok()?;
        serde_json::from_slice(&json).ok()
    }

    pub fn key(&self) -> (i64, u64) {
        (self.segment_id, self.frame_offset)
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Matches of the filter across all pages.
    pub total: u64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl<T> PaginatedResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            has_more: false,
            next_cursor: None,
        }
    }
}
