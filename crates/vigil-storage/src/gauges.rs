//! Counters shared between the writer thread and everyone who reports on it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free gauges updated by the store and the writer.
#[derive(Debug, Default)]
pub struct StoreGauges {
    lost_events: AtomicU64,
    degraded_buffered: AtomicU64,
    key_unavailable: AtomicBool,
    entries_written: AtomicU64,
    bytes_on_disk: AtomicU64,
}

impl StoreGauges {
    pub fn add_lost(&self, n: u64) {
        self.lost_events.fetch_add(n, Ordering::Relaxed);
    }

    pub fn lost_events(&self) -> u64 {
        self.lost_events.load(Ordering::Relaxed)
    }

    pub(crate) fn set_buffered(&self, n: usize) {
        self.degraded_buffered.store(n as u64, Ordering::Relaxed);
    }

    pub fn degraded_buffered(&self) -> u64 {
        self.degraded_buffered.load(Ordering::Relaxed)
    }

    pub(crate) fn set_key_unavailable(&self, unavailable: bool) {
        self.key_unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Whether the last append found the key missing.
    pub fn is_degraded(&self) -> bool {
        self.key_unavailable.load(Ordering::Relaxed)
    }

    pub(crate) fn add_written(&self, n: u64) {
        self.entries_written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn entries_written(&self) -> u64 {
        self.entries_written.load(Ordering::Relaxed)
    }

    pub(crate) fn set_bytes(&self, bytes: u64) {
        self.bytes_on_disk.store(bytes, Ordering::Relaxed);
    }

    pub fn bytes_on_disk(&self) -> u64 {
        self.bytes_on_disk.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub segments: u64,
    pub sealed_segments: u64,
    pub compressed_segments: u64,
    pub entries: u64,
    pub bytes_on_disk: u64,
    pub active_segment: Option<String>,
    pub degraded: bool,
    pub degraded_buffered: u64,
    pub lost_events: u64,
}
