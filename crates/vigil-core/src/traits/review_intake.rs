use crate::errors::VigilResult;
use crate::models::HallucinationAssessment;

/// Receives flagged assessments and turns them into review items.
pub trait IReviewIntake: Send + Sync {
    /// Returns the id of the created review item.
    fn enqueue(&self, assessment: &HallucinationAssessment) -> VigilResult<String>;
}
