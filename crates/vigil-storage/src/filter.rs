//! Query filters over stored entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::models::{EntryKind, Stage};

/// Conjunction of optional predicates. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub session_id: Option<String>,
    pub stage: Option<Stage>,
    pub kind: Option<EntryKind>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Half-open time range `[from, to)` over entry timestamps. Open ends are
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// The trailing `window` up to now.
    pub fn last(window: Duration) -> Self {
        Self {
            from: Some(Utc::now() - window),
            to: None,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |f| ts >= f) && self.to.map_or(true, |t| ts < t)
    }
}
