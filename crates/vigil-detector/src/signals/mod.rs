//! The four hallucination signals. Each returns a risk in [0, 1]
//! (0 = safe) plus the findings that explain it.

pub mod confidence;
pub mod consistency;
pub mod contradiction;
pub mod terminology;

use vigil_core::models::Finding;

/// Output of one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalResult {
    pub score: f64,
    pub findings: Vec<Finding>,
}

impl SignalResult {
    pub fn clean() -> Self {
        Self {
            score: 0.0,
            findings: Vec::new(),
        }
    }

    pub fn new(score: f64, findings: Vec<Finding>) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            findings,
        }
    }
}
