//! Queue ordering: risk tier descending, then first in first out.

use std::cmp::{Ordering, Reverse};

use vigil_core::models::{HallucinationAssessment, ReviewItem, ReviewPriority};

pub fn priority_for(assessment: &HallucinationAssessment) -> ReviewPriority {
    ReviewPriority {
        tier: assessment.risk_level,
        spread: assessment.signal_scores.spread(),
    }
}

/// Sort key for pending items. Spread does not take part: it is shown to the
/// reviewer, not used to jump the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingOrder(Reverse<vigil_core::models::RiskLevel>, u64);

impl PendingOrder {
    pub fn of(item: &ReviewItem) -> Self {
        Self(Reverse(item.priority.tier), item.enqueued_seq)
    }
}

pub fn compare(a: &ReviewItem, b: &ReviewItem) -> Ordering {
    PendingOrder::of(a).cmp(&PendingOrder::of(b))
}
