//! # vigil-detector
//!
//! Multi-signal hallucination risk scoring of generated answers.
//!
//! ## Signals
//! 1. **Confidence**: model-reported confidence against a floor
//! 2. **Source consistency**: answer sentences supported by retrieved chunks
//! 3. **Contradiction**: auditable regex rules for unsafe medical claims
//! 4. **Terminology**: domain terms validated against a controlled vocabulary
//!
//! A single signal past its own threshold sets the level on its own; the
//! weighted mean can only raise it further.

pub mod combine;
pub mod detector;
pub mod signals;
pub mod text;

pub use combine::{combine, Combination};
pub use detector::{DetectorStats, HallucinationDetector, ResponseContext, SignalReport};
pub use signals::contradiction::{ContraindicationRule, ContradictionRule, DoseLimit, RuleSet};
pub use signals::terminology::Vocabulary;
pub use signals::SignalResult;
