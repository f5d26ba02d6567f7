use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::CONTENT_HASH_HEX_LEN;

/// One-way BLAKE3 digest of a sensitive payload, rendered as lowercase hex.
///
/// This is the only form in which query text, answer text, client IPs and
/// user agents ever leave the call that received them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash a UTF-8 payload.
    pub fn of(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// Parse a previously rendered digest. Returns `None` unless the input is
    /// exactly 64 lowercase hex characters.
    pub fn parse(hex: &str) -> Option<Self> {
        let valid = hex.len() == CONTENT_HASH_HEX_LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(hex.to_string()))
    }

    /// Whether `text` hashes to this digest.
    pub fn matches(&self, text: &str) -> bool {
        Self::of(text) == *self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
