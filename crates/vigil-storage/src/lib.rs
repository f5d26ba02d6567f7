//! # vigil-storage
//!
//! Secure log store: AES-256-GCM encrypted, append-only segment files with a
//! SQLite index, size/age rotation, zstd compaction, tiered retention and a
//! degraded mode for when the encryption key is gone.
//!
//! All mutation happens on one thread. [`BatchWriter`] owns the store and
//! drains a bounded queue; [`MaintenanceScheduler`] feeds it periodic work
//! through the same queue. Reads go through [`StoreReader`], which opens its
//! own index connection.

pub mod crypto;
pub mod filter;
pub mod gauges;
pub mod index;
pub mod pagination;
pub mod reader;
pub mod retention;
pub mod scheduler;
pub mod segment;
pub mod store;
pub mod writer;

pub use crypto::{EnvKey, KeyProvider, StaticKey, StoreKey, SwappableKey};
pub use filter::{RecordFilter, TimeRange};
pub use gauges::{StoreGauges, StoreStats};
pub use pagination::{PaginatedResult, PaginationCursor};
pub use reader::StoreReader;
pub use retention::{RetentionPolicy, RetentionReport};
pub use scheduler::{MaintenanceIntervals, MaintenanceScheduler};
pub use store::{CompactionReport, EntryLocation, SecureLogStore};
pub use writer::{BatchWriter, ShutdownReport, WriteCommand};

use vigil_core::errors::StorageError;

/// Convert a rusqlite error into an index error.
pub(crate) fn index_err(e: rusqlite::Error) -> StorageError {
    StorageError::index(e)
}
