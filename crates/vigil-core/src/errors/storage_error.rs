/// Secure log store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O failure during {operation}: {message}")]
    Io { operation: String, message: String },

    #[error("storage quota exhausted: {used} of {limit} bytes in use")]
    DiskFull { used: u64, limit: u64 },

    #[error("index error: {message}")]
    Index { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("segment {segment} is corrupt: {details}")]
    Corruption { segment: String, details: String },

    /// The store key cannot be obtained. Fatal for durable writes until an
    /// operator restores the key; `buffered` tells whether the entry was kept
    /// in the degraded-mode buffer.
    #[error("encryption key unavailable: {reason} (buffered: {buffered})")]
    EncryptionKeyUnavailable { reason: String, buffered: bool },

    #[error("crypto failure: {reason}")]
    Crypto { reason: String },

    #[error("write queue full (capacity {capacity})")]
    WriteQueueFull { capacity: usize },

    #[error("writer is closed")]
    WriterClosed,

    #[error("entry {entry_id} already exists")]
    DuplicateEntry { entry_id: String },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },
}

impl StorageError {
    /// Transient failures: the same append may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::DiskFull { .. } | Self::WriteQueueFull { .. }
        )
    }

    pub fn io(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn index(err: impl std::fmt::Display) -> Self {
        Self::Index {
            message: err.to_string(),
        }
    }
}
