//! # vigil-core
//!
//! Foundation crate for the Vigil clinical-AI safety core.
//! Defines the event, assessment and review types, the error taxonomy,
//! configuration, constants and the sink traits that connect components.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::VigilConfig;
pub use errors::{VigilError, VigilResult};
pub use models::{
    ContentHash, EventRecord, HallucinationAssessment, MetricSnapshot, ReviewItem, RiskLevel,
    Stage, StageMetadata, StoredEntry,
};
