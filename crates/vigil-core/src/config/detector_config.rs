use serde::{Deserialize, Serialize};

use super::{check_unit, defaults, invalid};
use crate::errors::ConfigError;
use crate::models::{RiskLevel, Signal};

/// Relative weight of each signal in the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub confidence: f64,
    pub source_consistency: f64,
    pub contradiction: f64,
    pub terminology: f64,
}

impl SignalWeights {
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Confidence => self.confidence,
            Signal::SourceConsistency => self.source_consistency,
            Signal::Contradiction => self.contradiction,
            Signal::Terminology => self.terminology,
        }
    }

    pub fn total(&self) -> f64 {
        Signal::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            confidence: defaults::DEFAULT_WEIGHT_CONFIDENCE,
            source_consistency: defaults::DEFAULT_WEIGHT_SOURCE_CONSISTENCY,
            contradiction: defaults::DEFAULT_WEIGHT_CONTRADICTION,
            terminology: defaults::DEFAULT_WEIGHT_TERMINOLOGY,
        }
    }
}

/// Levels a single signal reaches on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSignalThresholds {
    pub high: f64,
    pub critical: f64,
}

impl Default for SingleSignalThresholds {
    fn default() -> Self {
        Self {
            high: defaults::DEFAULT_SINGLE_HIGH_THRESHOLD,
            critical: defaults::DEFAULT_SINGLE_CRITICAL_THRESHOLD,
        }
    }
}

/// Buckets applied to the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinedThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for CombinedThresholds {
    fn default() -> Self {
        Self {
            medium: defaults::DEFAULT_COMBINED_MEDIUM_THRESHOLD,
            high: defaults::DEFAULT_COMBINED_HIGH_THRESHOLD,
            critical: defaults::DEFAULT_COMBINED_CRITICAL_THRESHOLD,
        }
    }
}

/// Hallucination detector configuration.
///
/// The numeric thresholds are policy, not truth: tune them against labeled
/// answers before relying on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Generation confidence below which the confidence signal is high-risk.
    pub confidence_floor: f64,
    /// Fraction of a sentence's terms that must appear in the sources.
    pub claim_support_ratio: f64,
    /// Chunks scored below this are ignored as evidence.
    pub min_chunk_relevance: f64,
    pub weights: SignalWeights,
    pub confidence_thresholds: SingleSignalThresholds,
    pub source_consistency_thresholds: SingleSignalThresholds,
    pub contradiction_thresholds: SingleSignalThresholds,
    pub terminology_thresholds: SingleSignalThresholds,
    pub combined: CombinedThresholds,
    /// Assessments at or above this level are flagged for review.
    pub flag_threshold: RiskLevel,
    /// Optional newline-delimited controlled vocabulary file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_path: Option<String>,
    /// Terms accepted in addition to the built-in vocabulary.
    pub extra_vocabulary: Vec<String>,
}

impl DetectorConfig {
    /// Every weight finite and non-negative with a positive sum, every
    /// threshold in [0, 1] and ordered. Risk stays monotone in each signal
    /// only under these bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("detector.confidence_floor", self.confidence_floor)?;
        check_unit("detector.claim_support_ratio", self.claim_support_ratio)?;
        check_unit("detector.min_chunk_relevance", self.min_chunk_relevance)?;

        for signal in Signal::ALL {
            let weight = self.weights.get(signal);
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(
                    &format!("detector.weights.{}", signal.name()),
                    &format!("{weight} must be finite and non-negative"),
                ));
            }
        }
        if self.weights.total() <= 0.0 {
            return Err(invalid("detector.weights", "weights must sum to a positive value"));
        }

        let c = &self.combined;
        check_unit("detector.combined.medium", c.medium)?;
        check_unit("detector.combined.high", c.high)?;
        check_unit("detector.combined.critical", c.critical)?;
        if !(c.medium <= c.high && c.high <= c.critical) {
            return Err(invalid(
                "detector.combined",
                "thresholds must satisfy medium <= high <= critical",
            ));
        }

        for signal in Signal::ALL {
            let t = self.thresholds(signal);
            let field = format!("detector.{}_thresholds", signal.name());
            check_unit(&format!("{field}.high"), t.high)?;
            check_unit(&format!("{field}.critical"), t.critical)?;
            if t.high > t.critical {
                return Err(invalid(&field, "high must not exceed critical"));
            }
        }
        Ok(())
    }

    pub fn thresholds(&self, signal: Signal) -> SingleSignalThresholds {
        match signal {
            Signal::Confidence => self.confidence_thresholds,
            Signal::SourceConsistency => self.source_consistency_thresholds,
            Signal::Contradiction => self.contradiction_thresholds,
            Signal::Terminology => self.terminology_thresholds,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_floor: defaults::DEFAULT_CONFIDENCE_FLOOR,
            claim_support_ratio: defaults::DEFAULT_CLAIM_SUPPORT_RATIO,
            min_chunk_relevance: defaults::DEFAULT_MIN_CHUNK_RELEVANCE,
            weights: SignalWeights::default(),
            confidence_thresholds: SingleSignalThresholds::default(),
            source_consistency_thresholds: SingleSignalThresholds::default(),
            contradiction_thresholds: SingleSignalThresholds::default(),
            terminology_thresholds: SingleSignalThresholds::default(),
            combined: CombinedThresholds::default(),
            flag_threshold: RiskLevel::Medium,
            vocabulary_path: None,
            extra_vocabulary: Vec::new(),
        }
    }
}
