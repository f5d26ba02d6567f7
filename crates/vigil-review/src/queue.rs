//! [`ReviewQueue`]: the arena, its lookups and the reviewer-facing operations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use vigil_core::config::ReviewConfig;
use vigil_core::errors::{ReviewError, VigilError, VigilResult};
use vigil_core::models::{
    Decision, HallucinationAssessment, ReviewItem, ReviewState, ReviewStateKind, StoredEntry,
};
use vigil_core::traits::{IRecordSink, IReviewIntake};
use vigil_observability::review_span;

use crate::actor::ReleaseActor;
use crate::priority::{self, priority_for};
use crate::transitions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewStats {
    pub items: u64,
    pub pending: u64,
    pub claimed: u64,
    pub terminal: u64,
    pub persist_failures: u64,
}

pub struct ReviewQueue {
    config: ReviewConfig,
    items: DashMap<String, ReviewItem>,
    /// assessment_id → item_id
    by_assessment: DashMap<String, String>,
    next_seq: AtomicU64,
    sink: Option<Arc<dyn IRecordSink>>,
    persist_failures: AtomicU64,
}

impl ReviewQueue {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            config: config.clone(),
            items: DashMap::new(),
            by_assessment: DashMap::new(),
            next_seq: AtomicU64::new(0),
            sink: None,
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Persist creations and terminal decisions through `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn IRecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Create a pending item for a flagged assessment.
    pub fn enqueue(&self, assessment: &HallucinationAssessment) -> VigilResult<String> {
        if !assessment.flagged {
            return Err(ReviewError::NotFlagged {
                assessment_id: assessment.assessment_id.clone(),
            }
            .into());
        }

        let item = match self.by_assessment.entry(assessment.assessment_id.clone()) {
            Entry::Occupied(existing) => {
                return Err(ReviewError::Duplicate {
                    assessment_id: assessment.assessment_id.clone(),
                    item_id: existing.get().clone(),
                }
                .into());
            }
            Entry::Vacant(vacant) => {
                let item = ReviewItem {
                    item_id: uuid::Uuid::new_v4().to_string(),
                    assessment_id: assessment.assessment_id.clone(),
                    response_event_id: assessment.response_event_id.clone(),
                    session_id: assessment.session_id.clone(),
                    priority: priority_for(assessment),
                    state: ReviewState::Pending,
                    enqueued_seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                    created_at: Utc::now(),
                    revision: 0,
                    history: Vec::new(),
                };
                // Insert into the arena before releasing the assessment slot.
                self.items.insert(item.item_id.clone(), item.clone());
                vacant.insert(item.item_id.clone());
                item
            }
        };

        tracing::info!(
            event = "review_item_created",
            item_id = %item.item_id,
            assessment_id = %item.assessment_id,
            tier = %item.priority.tier,
            "review item created"
        );
        self.persist(&item);
        Ok(item.item_id)
    }

    /// Claim a pending item. Exactly one of several concurrent callers wins;
    /// the others get `AlreadyClaimed`.
    pub fn claim(&self, item_id: &str, reviewer_id: &str) -> VigilResult<ReviewItem> {
        let _span = review_span!("claim", item_id).entered();
        require_reviewer(reviewer_id)?;
        let item = self.transition(item_id, reviewer_id, |item, now| {
            transitions::claim(item, reviewer_id, now)
        })?;
        tracing::info!(event = "review_claimed", item_id = %item_id, reviewer_id = %reviewer_id, "item claimed");
        Ok(item)
    }

    /// Record the claimant's decision. Terminal.
    pub fn decide(
        &self,
        item_id: &str,
        reviewer_id: &str,
        decision: Decision,
        notes: &str,
    ) -> VigilResult<ReviewItem> {
        let _span = review_span!("decide", item_id).entered();
        require_reviewer(reviewer_id)?;
        if decision == Decision::Correct && notes.trim().is_empty() {
            return Err(VigilError::validation("a correction requires notes"));
        }
        let item = self.transition(item_id, reviewer_id, |item, now| {
            transitions::decide(item, reviewer_id, decision, notes, now)
        })?;
        tracing::info!(
            event = "review_decided",
            item_id = %item_id,
            reviewer_id = %reviewer_id,
            state = %item.state_kind(),
            "review decided"
        );
        self.persist(&item);
        Ok(item)
    }

    /// Return a claimed item to pending.
    pub fn release(&self, item_id: &str, actor: &ReleaseActor) -> VigilResult<ReviewItem> {
        let _span = review_span!("release", item_id).entered();
        require_reviewer(actor.id())?;
        let item = self.transition(item_id, &actor.to_string(), |item, _| {
            transitions::release(item, actor, &self.config)
        })?;
        tracing::info!(event = "review_released", item_id = %item_id, actor = %actor, "item released");
        Ok(item)
    }

    /// Claim the highest-priority pending item, if any.
    pub fn claim_next(&self, reviewer_id: &str) -> VigilResult<Option<ReviewItem>> {
        require_reviewer(reviewer_id)?;
        // Candidates are collected first: no arena guard is held while claiming.
        for candidate in self.list_pending(usize::MAX) {
            match self.claim(&candidate.item_id, reviewer_id) {
                Ok(item) => return Ok(Some(item)),
                Err(VigilError::ReviewError(
                    ReviewError::AlreadyClaimed { .. } | ReviewError::InvalidTransition { .. },
                )) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Pending items, critical first, oldest first within a tier.
    pub fn list_pending(&self, limit: usize) -> Vec<ReviewItem> {
        let mut pending: Vec<ReviewItem> = self
            .items
            .iter()
            .filter(|r| r.state_kind() == ReviewStateKind::Pending)
            .map(|r| r.value().clone())
            .collect();
        pending.sort_by(priority::compare);
        pending.truncate(limit);
        pending
    }

    /// Decided items, most recent decision first.
    pub fn list_terminal(&self, limit: usize) -> Vec<ReviewItem> {
        let mut done: Vec<ReviewItem> = self
            .items
            .iter()
            .filter(|r| r.is_terminal())
            .map(|r| r.value().clone())
            .collect();
        done.sort_by(|a, b| b.decided_at().cmp(&a.decided_at()));
        done.truncate(limit);
        done
    }

    pub fn get(&self, item_id: &str) -> Option<ReviewItem> {
        self.items.get(item_id).map(|r| r.value().clone())
    }

    pub fn get_by_assessment(&self, assessment_id: &str) -> Option<ReviewItem> {
        let item_id = self.by_assessment.get(assessment_id)?.value().clone();
        self.get(&item_id)
    }

    pub fn counts_by_state(&self) -> BTreeMap<ReviewStateKind, usize> {
        let mut counts = BTreeMap::new();
        for item in self.items.iter() {
            *counts.entry(item.state_kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn stats(&self) -> ReviewStats {
        let counts = self.counts_by_state();
        let count = |k: ReviewStateKind| counts.get(&k).copied().unwrap_or(0) as u64;
        ReviewStats {
            items: self.len() as u64,
            pending: count(ReviewStateKind::Pending),
            claimed: count(ReviewStateKind::Claimed),
            terminal: count(ReviewStateKind::Approved)
                + count(ReviewStateKind::Rejected)
                + count(ReviewStateKind::Corrected),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }

    /// Check-and-set under the item's shard lock.
    fn transition<F>(&self, item_id: &str, actor: &str, next: F) -> VigilResult<ReviewItem>
    where
        F: FnOnce(&ReviewItem, chrono::DateTime<Utc>) -> Result<ReviewState, ReviewError>,
    {
        let mut entry = self.items.get_mut(item_id).ok_or_else(|| ReviewError::NotFound {
            item_id: item_id.to_string(),
        })?;
        let now = Utc::now();
        let state = next(&entry, now)?;
        transitions::apply(&mut entry, state, actor, now);
        Ok(entry.value().clone())
    }

    fn persist(&self, item: &ReviewItem) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(e) = sink.submit(StoredEntry::Review(item.clone())) {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                event = "review_persist_failed",
                item_id = %item.item_id,
                revision = item.revision,
                error = %e,
                "review item not persisted"
            );
        }
    }
}

fn require_reviewer(reviewer_id: &str) -> VigilResult<()> {
    if reviewer_id.trim().is_empty() {
        return Err(VigilError::validation("reviewer_id must not be empty"));
    }
    Ok(())
}

impl IReviewIntake for ReviewQueue {
    fn enqueue(&self, assessment: &HallucinationAssessment) -> VigilResult<String> {
        ReviewQueue::enqueue(self, assessment)
    }
}
