use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::VigilError;

/// Ordered hallucination risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(VigilError::validation(format!("unknown risk level: {other}"))),
        }
    }
}

/// The four independent hallucination signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Confidence,
    SourceConsistency,
    Contradiction,
    Terminology,
}

impl Signal {
    pub const ALL: [Signal; 4] = [
        Signal::Confidence,
        Signal::SourceConsistency,
        Signal::Contradiction,
        Signal::Terminology,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Signal::Confidence => "confidence",
            Signal::SourceConsistency => "source_consistency",
            Signal::Contradiction => "contradiction",
            Signal::Terminology => "terminology",
        }
    }
}

/// Per-signal risk scores, each in [0, 1] (0 = safe).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    pub confidence: f64,
    pub source_consistency: f64,
    pub contradiction: f64,
    pub terminology: f64,
}

impl SignalScores {
    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Confidence => self.confidence,
            Signal::SourceConsistency => self.source_consistency,
            Signal::Contradiction => self.contradiction,
            Signal::Terminology => self.terminology,
        }
    }

    pub fn set(&mut self, signal: Signal, score: f64) {
        let score = score.clamp(0.0, 1.0);
        match signal {
            Signal::Confidence => self.confidence = score,
            Signal::SourceConsistency => self.source_consistency = score,
            Signal::Contradiction => self.contradiction = score,
            Signal::Terminology => self.terminology = score,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        Signal::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Scores keyed by signal name.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        self.iter().map(|(s, v)| (s.name(), v)).collect()
    }

    /// Population standard deviation across the four signals.
    pub fn spread(&self) -> f64 {
        let n = Signal::ALL.len() as f64;
        let mean = self.iter().map(|(_, v)| v).sum::<f64>() / n;
        let var = self.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / n;
        var.sqrt()
    }
}

/// One piece of evidence behind a signal score. Never contains answer text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub signal: Signal,
    pub rule_id: String,
    pub description: String,
}

/// Immutable risk assessment of one `response` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallucinationAssessment {
    pub assessment_id: String,
    pub response_event_id: String,
    pub session_id: String,
    pub risk_level: RiskLevel,
    pub signal_scores: SignalScores,
    pub weighted_mean: f64,
    /// Signals that escalated the level on their own.
    pub triggered_by: Vec<Signal>,
    pub findings: Vec<Finding>,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
}
