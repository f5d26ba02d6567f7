//! Pure transitions of the review state machine.
//!
//! ```text
//! Pending ──claim──▶ Claimed ──decide──▶ Approved | Rejected | Corrected
//!    ▲                  │
//!    └─────release──────┘
//! ```
//!
//! Each function inspects an item and returns the next state or the error a
//! reviewer sees. [`apply`] commits a next state with its audit entry.

use chrono::{DateTime, Utc};
use vigil_core::config::ReviewConfig;
use vigil_core::errors::ReviewError;
use vigil_core::models::{Decision, ReviewItem, ReviewState, ReviewStateKind, ReviewTransition};

use crate::actor::ReleaseActor;

fn invalid(item: &ReviewItem, to: ReviewStateKind) -> ReviewError {
    ReviewError::InvalidTransition {
        item_id: item.item_id.clone(),
        from: item.state_kind().to_string(),
        to: to.to_string(),
    }
}

pub fn claim(item: &ReviewItem, reviewer_id: &str, now: DateTime<Utc>) -> Result<ReviewState, ReviewError> {
    match &item.state {
        ReviewState::Pending => Ok(ReviewState::Claimed {
            reviewer_id: reviewer_id.to_string(),
            claimed_at: now,
        }),
        ReviewState::Claimed { reviewer_id: holder, .. } => Err(ReviewError::AlreadyClaimed {
            item_id: item.item_id.clone(),
            holder: holder.clone(),
        }),
        _ => Err(invalid(item, ReviewStateKind::Claimed)),
    }
}

pub fn decide(
    item: &ReviewItem,
    reviewer_id: &str,
    decision: Decision,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<ReviewState, ReviewError> {
    let to = ReviewStateKind::from(decision);
    match &item.state {
        ReviewState::Claimed { reviewer_id: holder, .. } if holder != reviewer_id => {
            Err(ReviewError::Unauthorized {
                item_id: item.item_id.clone(),
                reviewer_id: reviewer_id.to_string(),
                reason: format!("item is claimed by {holder}"),
            })
        }
        ReviewState::Claimed { .. } => {
            let reviewer_id = reviewer_id.to_string();
            let notes = notes.to_string();
            Ok(match decision {
                Decision::Approve => ReviewState::Approved { reviewer_id, notes, decided_at: now },
                Decision::Reject => ReviewState::Rejected { reviewer_id, notes, decided_at: now },
                Decision::Correct => ReviewState::Corrected { reviewer_id, notes, decided_at: now },
            })
        }
        _ => Err(invalid(item, to)),
    }
}

pub fn release(
    item: &ReviewItem,
    actor: &ReleaseActor,
    policy: &ReviewConfig,
) -> Result<ReviewState, ReviewError> {
    let ReviewState::Claimed { reviewer_id: holder, .. } = &item.state else {
        return Err(invalid(item, ReviewStateKind::Pending));
    };
    let unauthorized = |reason: String| ReviewError::Unauthorized {
        item_id: item.item_id.clone(),
        reviewer_id: actor.id().to_string(),
        reason,
    };
    match actor {
        ReleaseActor::Reviewer(id) if id == holder => Ok(ReviewState::Pending),
        ReleaseActor::Reviewer(_) => Err(unauthorized(format!("item is claimed by {holder}"))),
        ReleaseActor::Admin(_) if !policy.admin_override_enabled => {
            Err(unauthorized("admin override is disabled".into()))
        }
        ReleaseActor::Admin(id) if !policy.admin_ids.iter().any(|a| a == id) => {
            Err(unauthorized("not an administrator".into()))
        }
        ReleaseActor::Admin(_) => Ok(ReviewState::Pending),
    }
}

/// Commit `next`, appending the audit transition and bumping the revision.
pub fn apply(item: &mut ReviewItem, next: ReviewState, actor: &str, now: DateTime<Utc>) {
    item.history.push(ReviewTransition {
        from: item.state_kind(),
        to: next.kind(),
        actor: actor.to_string(),
        at: now,
    });
    item.state = next;
    item.revision += 1;
}
