//! # vigil-review
//!
//! Queue of flagged assessments awaiting clinician review.
//!
//! Items live in a `DashMap` arena keyed by item id. Every state change is a
//! pure function over [`ReviewState`](vigil_core::models::ReviewState),
//! applied under the entry's shard lock, so two reviewers racing for the same
//! item see exactly one winner.

pub mod actor;
pub mod priority;
pub mod queue;
pub mod transitions;

pub use actor::ReleaseActor;
pub use priority::{priority_for, PendingOrder};
pub use queue::{ReviewQueue, ReviewStats};
