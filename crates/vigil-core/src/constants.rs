/// Vigil system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reserved session id for events the system emits about itself
/// (retention purges, key revocations).
pub const SYSTEM_SESSION_ID: &str = "system";

/// Length of a rendered content hash (BLAKE3, lowercase hex).
pub const CONTENT_HASH_HEX_LEN: usize = 64;

/// Upper bound on an accepted session id.
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Upper bound on the page size of a history query.
pub const MAX_PAGE_SIZE: usize = 1_000;
