use crate::errors::VigilResult;
use crate::models::StoredEntry;

/// Durable write path. Implementations must not block on storage I/O.
pub trait IRecordSink: Send + Sync {
    /// Hand an entry over for persistence.
    fn submit(&self, entry: StoredEntry) -> VigilResult<()>;
}
