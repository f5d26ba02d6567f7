// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_STORE_DIR: &str = "vigil-store";
pub const DEFAULT_SEGMENT_MAX_BYTES: u64 = 8 * 1024 * 1024; // 8 MB
pub const DEFAULT_SEGMENT_MAX_AGE_SECS: u64 = 3600;
pub const DEFAULT_RAW_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_COMPRESSED_RETENTION_DAYS: u32 = 90;
pub const DEFAULT_AGGREGATE_RETENTION_DAYS: u32 = 365;
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
pub const DEFAULT_WRITE_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_DEGRADED_BUFFER_CAPACITY: usize = 4096;
pub const DEFAULT_APPEND_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_APPEND_RETRY_BACKOFF_MS: u64 = 10;
pub const DEFAULT_ROTATE_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_COMPACTION_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;
pub const DEFAULT_KEY_ENV_VAR: &str = "VIGIL_STORE_KEY";

// --- Metrics ---
pub const DEFAULT_WINDOW_MAX_EVENTS: usize = 10_000;
pub const DEFAULT_WINDOW_MAX_AGE_SECS: u64 = 300;
pub const DEFAULT_QPS_WINDOW_SECS: u64 = 10;

// --- Alerts ---
pub const DEFAULT_ALERT_MIN_REQUESTS: u64 = 20;
pub const DEFAULT_ERROR_RATE_WARNING: f64 = 0.05;
pub const DEFAULT_ERROR_RATE_CRITICAL: f64 = 0.20;
pub const DEFAULT_FLAG_RATE_WARNING: f64 = 0.10;
pub const DEFAULT_FLAG_RATE_CRITICAL: f64 = 0.30;
pub const DEFAULT_P95_LATENCY_WARNING_MS: u64 = 5_000;
pub const DEFAULT_P95_LATENCY_CRITICAL_MS: u64 = 15_000;
pub const DEFAULT_LOST_EVENTS_WARNING: u64 = 1;
pub const DEFAULT_LOST_EVENTS_CRITICAL: u64 = 100;

// --- Logger ---
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_FALLBACK_RING_CAPACITY: usize = 256;

// --- Detector ---
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.6;
pub const DEFAULT_CLAIM_SUPPORT_RATIO: f64 = 0.5;
pub const DEFAULT_MIN_CHUNK_RELEVANCE: f64 = 0.0;
pub const DEFAULT_WEIGHT_CONFIDENCE: f64 = 0.30;
pub const DEFAULT_WEIGHT_SOURCE_CONSISTENCY: f64 = 0.30;
pub const DEFAULT_WEIGHT_CONTRADICTION: f64 = 0.25;
pub const DEFAULT_WEIGHT_TERMINOLOGY: f64 = 0.15;
pub const DEFAULT_SINGLE_HIGH_THRESHOLD: f64 = 0.70;
pub const DEFAULT_SINGLE_CRITICAL_THRESHOLD: f64 = 0.85;
pub const DEFAULT_COMBINED_MEDIUM_THRESHOLD: f64 = 0.30;
pub const DEFAULT_COMBINED_HIGH_THRESHOLD: f64 = 0.50;
pub const DEFAULT_COMBINED_CRITICAL_THRESHOLD: f64 = 0.70;

// --- Review ---
pub const DEFAULT_ADMIN_OVERRIDE_ENABLED: bool = true;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
