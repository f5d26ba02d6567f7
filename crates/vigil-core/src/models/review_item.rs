use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Reviewer verdict for a claimed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
    Correct,
}

/// Review workflow state. `Pending` is initial; `Approved`, `Rejected` and
/// `Corrected` are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Claimed {
        reviewer_id: String,
        claimed_at: DateTime<Utc>,
    },
    Approved {
        reviewer_id: String,
        notes: String,
        decided_at: DateTime<Utc>,
    },
    Rejected {
        reviewer_id: String,
        notes: String,
        decided_at: DateTime<Utc>,
    },
    Corrected {
        reviewer_id: String,
        notes: String,
        decided_at: DateTime<Utc>,
    },
}

/// Data-free discriminant of [`ReviewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStateKind {
    Pending,
    Claimed,
    Approved,
    Rejected,
    Corrected,
}

impl ReviewStateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Corrected => "corrected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Corrected)
    }
}

impl fmt::Display for ReviewStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Decision> for ReviewStateKind {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Approve => Self::Approved,
            Decision::Reject => Self::Rejected,
            Decision::Correct => Self::Corrected,
        }
    }
}

impl ReviewState {
    pub fn kind(&self) -> ReviewStateKind {
        match self {
            Self::Pending => ReviewStateKind::Pending,
            Self::Claimed { .. } => ReviewStateKind::Claimed,
            Self::Approved { .. } => ReviewStateKind::Approved,
            Self::Rejected { .. } => ReviewStateKind::Rejected,
            Self::Corrected { .. } => ReviewStateKind::Corrected,
        }
    }

    pub fn reviewer_id(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Claimed { reviewer_id, .. }
            | Self::Approved { reviewer_id, .. }
            | Self::Rejected { reviewer_id, .. }
            | Self::Corrected { reviewer_id, .. } => Some(reviewer_id),
        }
    }
}

/// Queue ordering key: tier first, then FIFO by `enqueued_seq`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewPriority {
    pub tier: RiskLevel,
    /// Standard deviation of the signal scores.
    pub spread: f64,
}

/// Audit record of one state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTransition {
    pub from: ReviewStateKind,
    pub to: ReviewStateKind,
    pub actor: String,
    pub at: DateTime<Utc>,
}

/// A flagged assessment awaiting or having received human adjudication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub item_id: String,
    pub assessment_id: String,
    pub response_event_id: String,
    pub session_id: String,
    pub priority: ReviewPriority,
    pub state: ReviewState,
    pub enqueued_seq: u64,
    pub created_at: DateTime<Utc>,
    /// Bumped on every transition.
    pub revision: u32,
    pub history: Vec<ReviewTransition>,
}

impl ReviewItem {
    pub fn state_kind(&self) -> ReviewStateKind {
        self.state.kind()
    }

    pub fn is_terminal(&self) -> bool {
        self.state_kind().is_terminal()
    }

    pub fn reviewer_id(&self) -> Option<&str> {
        self.state.reviewer_id()
    }

    pub fn decision_notes(&self) -> Option<&str> {
        match &self.state {
            ReviewState::Approved { notes, .. }
            | ReviewState::Rejected { notes, .. }
            | ReviewState::Corrected { notes, .. } => Some(notes),
            _ => None,
        }
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            ReviewState::Approved { decided_at, .. }
            | ReviewState::Rejected { decided_at, .. }
            | ReviewState::Corrected { decided_at, .. } => Some(*decided_at),
            _ => None,
        }
    }
}
