use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventRecord, HallucinationAssessment, ReviewItem, Stage};

/// The unit of persistence in the secure log store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum StoredEntry {
    Event(EventRecord),
    Assessment(HallucinationAssessment),
    Review(ReviewItem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Event,
    Assessment,
    Review,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Event => "event",
            EntryKind::Assessment => "assessment",
            EntryKind::Review => "review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" => Some(EntryKind::Event),
            "assessment" => Some(EntryKind::Assessment),
            "review" => Some(EntryKind::Review),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoredEntry {
    /// Write-once key of this entry. Review snapshots are keyed per revision.
    pub fn entry_id(&self) -> String {
        match self {
            StoredEntry::Event(e) => e.event_id.clone(),
            StoredEntry::Assessment(a) => a.assessment_id.clone(),
            StoredEntry::Review(r) => format!("{}:{}", r.item_id, r.revision),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            StoredEntry::Event(_) => EntryKind::Event,
            StoredEntry::Assessment(_) => EntryKind::Assessment,
            StoredEntry::Review(_) => EntryKind::Review,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            StoredEntry::Event(e) => &e.session_id,
            StoredEntry::Assessment(a) => &a.session_id,
            StoredEntry::Review(r) => &r.session_id,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            StoredEntry::Event(e) => Some(e.stage),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StoredEntry::Event(e) => e.timestamp,
            StoredEntry::Assessment(a) => a.created_at,
            StoredEntry::Review(r) => r
                .history
                .last()
                .map(|t| t.at)
                .unwrap_or(r.created_at),
        }
    }
}
