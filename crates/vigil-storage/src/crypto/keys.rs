use std::fmt;
use std::sync::RwLock;

use rand::RngCore;
use vigil_core::errors::StorageError;

/// A 256-bit AES-GCM key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreKey([u8; 32]);

impl StoreKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hex characters.
    pub fn from_hex(text: &str) -> Result<Self, StorageError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(text.trim(), &mut out).map_err(|e| StorageError::Crypto {
            reason: format!("invalid hex key: {e}"),
        })?;
        Ok(Self(out))
    }

    /// Fresh random key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(..)")
    }
}

/// Source of the store key. Consulted on every append and read, so a
/// revoked key takes effect immediately.
pub trait KeyProvider: Send + Sync {
    fn current_key(&self) -> Result<StoreKey, StorageError>;
}

/// A fixed key, for tests and embedded use.
#[derive(Debug, Clone)]
pub struct StaticKey(StoreKey);

impl StaticKey {
    pub fn new(key: StoreKey) -> Self {
        Self(key)
    }
}

impl KeyProvider for StaticKey {
    fn current_key(&self) -> Result<StoreKey, StorageError> {
        Ok(self.0.clone())
    }
}

/// Reads a hex key from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvKey {
    var: String,
}

impl EnvKey {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeyProvider for EnvKey {
    fn current_key(&self) -> Result<StoreKey, StorageError> {
        let raw = std::env::var(&self.var).map_err(|_| StorageError::EncryptionKeyUnavailable {
            reason: format!("{} is not set", self.var),
            buffered: false,
        })?;
        StoreKey::from_hex(&raw).map_err(|e| StorageError::EncryptionKeyUnavailable {
            reason: format!("{} is malformed: {e}", self.var),
            buffered: false,
        })
    }
}

/// A key an operator can revoke and restore at runtime.
#[derive(Debug)]
pub struct SwappableKey {
    slot: RwLock<Option<StoreKey>>,
}

impl SwappableKey {
    pub fn new(key: StoreKey) -> Self {
        Self {
            slot: RwLock::new(Some(key)),
        }
    }

    /// Start without a key.
    pub fn empty() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn revoke(&self) {
        *self.slot.write().unwrap_or_else(|p| p.into_inner()) = None;
        tracing::warn!(event = "store_key_revoked", "store encryption key revoked");
    }

    pub fn restore(&self, key: StoreKey) {
        *self.slot.write().unwrap_or_else(|p| p.into_inner()) = Some(key);
        tracing::info!(event = "store_key_restored", "store encryption key restored");
    }

    pub fn is_available(&self) -> bool {
        self.slot.read().unwrap_or_else(|p| p.into_inner()).is_some()
    }
}

impl KeyProvider for SwappableKey {
    fn current_key(&self) -> Result<StoreKey, StorageError> {
        self.slot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(|| StorageError::EncryptionKeyUnavailable {
                reason: "key revoked".into(),
                buffered: false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let key = StoreKey::generate();
        assert_eq!(StoreKey::from_hex(&key.to_hex()).unwrap(), key);
    }

    #[test]
    fn rejects_short_hex() {
        assert!(StoreKey::from_hex("abcd").is_err());
        assert!(StoreKey::from_hex(&"zz".repeat(32)).is_err());
        assert!(StoreKey::from_hex(&"ab".repeat(33)).is_err());
    }

    #[test]
    fn hex_is_lowercase_and_trimmed_on_parse() {
        let key = StoreKey::from_bytes([0xab; 32]);
        assert_eq!(key.to_hex(), "ab".repeat(32));
        assert_eq!(StoreKey::from_hex(&format!("  {}\n", "AB".repeat(32))).unwrap(), key);
    }

    #[test]
    fn debug_never_prints_key_material() {
        let key = StoreKey::from_bytes([0xab; 32]);
        assert!(!format!("{key:?}").contains("ab"));
    }

    #[test]
    fn swappable_key_revoke_and_restore() {
        let key = StoreKey::generate();
        let provider = SwappableKey::new(key.clone());
        assert!(provider.current_key().is_ok());
        provider.revoke();
        assert!(matches!(
            provider.current_key(),
            Err(StorageError::EncryptionKeyUnavailable { .. })
        ));
        provider.restore(key);
        assert!(provider.is_available());
    }
}
