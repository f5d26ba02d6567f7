//! Confidence signal.

use vigil_core::models::{Finding, Signal};

use super::SignalResult;

/// Risk from model-reported confidence `c` given `floor`.
///
/// At or above the floor the risk falls linearly from 0.5 to 0. Below it the
/// risk starts at 0.9 and reaches 1.0 at zero confidence.
pub fn risk(c: f64, floor: f64) -> f64 {
    if c >= floor {
        if floor >= 1.0 {
            0.0
        } else {
            0.5 * (1.0 - c) / (1.0 - floor)
        }
    } else {
        0.9 + 0.1 * (floor - c) / floor
    }
}

pub fn evaluate(confidence: f64, floor: f64) -> SignalResult {
    let score = risk(confidence, floor);
    let findings = if confidence < floor {
        vec![Finding {
            signal: Signal::Confidence,
            rule_id: "below_confidence_floor".into(),
            description: format!("confidence {confidence:.2} below floor {floor:.2}"),
        }]
    } else {
        Vec::new()
    };
    SignalResult::new(score, findings)
}
