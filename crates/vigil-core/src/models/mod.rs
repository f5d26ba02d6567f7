mod assessment;
mod collaborators;
mod content_hash;
mod event_record;
mod metric_snapshot;
mod review_item;
mod stage;
mod stage_metadata;
mod stored_entry;

pub use assessment::{Finding, HallucinationAssessment, RiskLevel, Signal, SignalScores};
pub use collaborators::{ClientInfo, GenerationOutput, RetrievalOutput, RetrievedChunk};
pub use content_hash::ContentHash;
pub use event_record::EventRecord;
pub use metric_snapshot::{LatencyPercentiles, MetricSnapshot};
pub use review_item::{
    Decision, ReviewItem, ReviewPriority, ReviewState, ReviewStateKind, ReviewTransition,
};
pub use stage::Stage;
pub use stage_metadata::StageMetadata;
pub use stored_entry::{EntryKind, StoredEntry};
