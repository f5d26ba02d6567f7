use serde::{Deserialize, Serialize};

use super::defaults;

/// Secure log store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding segments and the index database.
    pub dir: String,
    /// Rotate the active segment once it reaches this size.
    pub segment_max_bytes: u64,
    /// Rotate the active segment once it reaches this age.
    pub segment_max_age_secs: u64,
    /// Quota over all segment files; appends beyond it fail retryably.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_store_bytes: Option<u64>,
    pub raw_retention_days: u32,
    pub compressed_retention_days: u32,
    pub aggregate_retention_days: u32,
    /// zstd level for rotated segments.
    pub compression_level: i32,
    pub write_queue_capacity: usize,
    /// Entries held in memory while the encryption key is unavailable.
    pub degraded_buffer_capacity: usize,
    pub append_retry_attempts: u32,
    pub append_retry_backoff_ms: u64,
    pub rotate_check_interval_secs: u64,
    pub compaction_interval_secs: u64,
    pub retention_interval_secs: u64,
    pub shutdown_grace_ms: u64,
    /// Environment variable carrying the hex-encoded 32-byte store key.
    pub key_env_var: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::DEFAULT_STORE_DIR.to_string(),
            segment_max_bytes: defaults::DEFAULT_SEGMENT_MAX_BYTES,
            segment_max_age_secs: defaults::DEFAULT_SEGMENT_MAX_AGE_SECS,
            max_store_bytes: None,
            raw_retention_days: defaults::DEFAULT_RAW_RETENTION_DAYS,
            compressed_retention_days: defaults::DEFAULT_COMPRESSED_RETENTION_DAYS,
            aggregate_retention_days: defaults::DEFAULT_AGGREGATE_RETENTION_DAYS,
            compression_level: defaults::DEFAULT_COMPRESSION_LEVEL,
            write_queue_capacity: defaults::DEFAULT_WRITE_QUEUE_CAPACITY,
            degraded_buffer_capacity: defaults::DEFAULT_DEGRADED_BUFFER_CAPACITY,
            append_retry_attempts: defaults::DEFAULT_APPEND_RETRY_ATTEMPTS,
            append_retry_backoff_ms: defaults::DEFAULT_APPEND_RETRY_BACKOFF_MS,
            rotate_check_interval_secs: defaults::DEFAULT_ROTATE_CHECK_INTERVAL_SECS,
            compaction_interval_secs: defaults::DEFAULT_COMPACTION_INTERVAL_SECS,
            retention_interval_secs: defaults::DEFAULT_RETENTION_INTERVAL_SECS,
            shutdown_grace_ms: defaults::DEFAULT_SHUTDOWN_GRACE_MS,
            key_env_var: defaults::DEFAULT_KEY_ENV_VAR.to_string(),
        }
    }
}
