use crate::errors::VigilResult;
use crate::models::{EventRecord, HallucinationAssessment};

/// In-memory metrics path, fed alongside the durable sink.
pub trait IEventObserver: Send + Sync {
    fn observe(&self, record: &EventRecord) -> VigilResult<()>;

    /// Called once per completed assessment.
    fn observe_assessment(&self, _assessment: &HallucinationAssessment) -> VigilResult<()> {
        Ok(())
    }
}
