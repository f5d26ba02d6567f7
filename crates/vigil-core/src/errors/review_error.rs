/// Review queue transition and lookup errors.
///
/// These are the only errors surfaced straight to a reviewer: they describe a
/// concurrent-use conflict the caller has to react to.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("review item {item_id} is already claimed by {holder}")]
    AlreadyClaimed { item_id: String, holder: String },

    #[error("reviewer {reviewer_id} may not act on item {item_id}: {reason}")]
    Unauthorized {
        item_id: String,
        reviewer_id: String,
        reason: String,
    },

    #[error("review item {item_id} cannot move from {from} to {to}")]
    InvalidTransition {
        item_id: String,
        from: String,
        to: String,
    },

    #[error("review item not found: {item_id}")]
    NotFound { item_id: String },

    #[error("assessment {assessment_id} is not flagged")]
    NotFlagged { assessment_id: String },

    #[error("assessment {assessment_id} already has review item {item_id}")]
    Duplicate {
        assessment_id: String,
        item_id: String,
    },
}
