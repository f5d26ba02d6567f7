//! Fallback channel: where failures of the logger itself go.
//!
//! Every entry is emitted on the `vigil::fallback` tracing target and kept in
//! a bounded ring for inspection. Session ids are hashed before they land here.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::models::{ContentHash, Stage};
use vigil_observability::tracing_setup::spans::session_hash;

pub const FALLBACK_TARGET: &str = "vigil::fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Validation,
    SinkFailed,
    ObserverFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackReason::Validation => "validation",
            FallbackReason::SinkFailed => "sink_failed",
            FallbackReason::ObserverFailed => "observer_failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    pub reason: FallbackReason,
    pub stage: Option<Stage>,
    pub session_hash: Option<ContentHash>,
    pub detail: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FallbackChannel {
    ring: Mutex<VecDeque<FallbackEntry>>,
    capacity: usize,
    total: AtomicU64,
}

impl FallbackChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            total: AtomicU64::new(0),
        }
    }

    pub fn record(&self, reason: FallbackReason, stage: Option<Stage>, session_id: Option<&str>, detail: String) {
        let entry = FallbackEntry {
            reason,
            stage,
            session_hash: session_id.filter(|s| !s.is_empty()).map(session_hash),
            detail,
            at: Utc::now(),
        };
        tracing::error!(
            target: FALLBACK_TARGET,
            event = "logger_fallback",
            reason = %entry.reason,
            stage = ?entry.stage,
            session_hash = ?entry.session_hash.as_ref().map(|h| h.as_str()),
            detail = %entry.detail,
            "event logger fallback"
        );
        self.total.fetch_add(1, Ordering::Relaxed);

        if self.capacity == 0 {
            return;
        }
        let mut ring = self.ring.lock().unwrap_or_else(|p| p.into_inner());
        if ring.len() >= self.capacity {
            ring.pop_front();
        }
        ring.push_back(entry);
    }

    /// Lifetime count, including entries rotated out of the ring.
    pub fn count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Most recent entries, oldest first.
    pub fn recent(&self) -> Vec<FallbackEntry> {
        self.ring
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn count_reason(&self, reason: FallbackReason) -> usize {
        self.ring
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|e| e.reason == reason)
            .count()
    }
}
