//! Per-session sequencing state.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use vigil_core::models::Stage;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub next_sequence: u32,
    /// The most recent query event of the session.
    pub query_event_id: Option<String>,
    pub last_stage: Option<Stage>,
    pub last_seen: Instant,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            next_sequence: 0,
            query_event_id: None,
            last_stage: None,
            last_seen: Instant::now(),
        }
    }

    /// Take the next sequence number and record `stage` as observed.
    pub fn advance(&mut self, stage: Stage) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.last_stage = Some(stage);
        self.last_seen = Instant::now();
        sequence
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// `session_id → SessionState`, sharded.
#[derive(Debug, Default)]
pub struct SessionTable {
    inner: DashMap<String, SessionState>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn map(&self) -> &DashMap<String, SessionState> {
        &self.inner
    }

    pub fn get(&self, session_id: &str) -> Option<SessionState> {
        self.inner.get(session_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop sessions not seen for longer than `idle`. Returns how many.
    pub fn purge_idle(&self, idle: Duration, now: Instant) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, state| state.idle_for(now) <= idle);
        before.saturating_sub(self.inner.len())
    }
}
