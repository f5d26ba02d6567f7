//! Max-dominant combination of the four signal scores into a risk level.

use vigil_core::config::DetectorConfig;
use vigil_core::models::{RiskLevel, Signal, SignalScores};

/// The level, the weighted mean behind it, and the signals that reached
/// High or Critical on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub risk_level: RiskLevel,
    pub weighted_mean: f64,
    pub triggered_by: Vec<Signal>,
}

/// Level one signal reaches against its own thresholds.
pub fn single_signal_level(signal: Signal, score: f64, config: &DetectorConfig) -> RiskLevel {
    let t = config.thresholds(signal);
    if score >= t.critical {
        RiskLevel::Critical
    } else if score >= t.high {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

/// Σ wᵢ·sᵢ / Σ wᵢ. Zero when every weight is zero.
pub fn weighted_mean(scores: &SignalScores, config: &DetectorConfig) -> f64 {
    let total = config.weights.total();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = scores.iter().map(|(s, v)| config.weights.get(s) * v).sum();
    (sum / total).clamp(0.0, 1.0)
}

fn mean_level(mean: f64, config: &DetectorConfig) -> RiskLevel {
    let t = &config.combined;
    if mean >= t.critical {
        RiskLevel::Critical
    } else if mean >= t.high {
        RiskLevel::High
    } else if mean >= t.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn combine(scores: &SignalScores, config: &DetectorConfig) -> Combination {
    let mut risk_level = RiskLevel::Low;
    let mut triggered_by = Vec::new();
    for (signal, score) in scores.iter() {
        let level = single_signal_level(signal, score, config);
        if level >= RiskLevel::High {
            triggered_by.push(signal);
        }
        risk_level = risk_level.max(level);
    }

    let weighted_mean = weighted_mean(scores, config);
    Combination {
        risk_level: risk_level.max(mean_level(weighted_mean, config)),
        weighted_mean,
        triggered_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(c: f64, s: f64, x: f64, t: f64) -> SignalScores {
        SignalScores {
            confidence: c,
            source_consistency: s,
            contradiction: x,
            terminology: t,
        }
    }

    #[test]
    fn all_safe_is_low() {
        let c = combine(&SignalScores::default(), &DetectorConfig::default());
        assert_eq!(c.risk_level, RiskLevel::Low);
        assert!(c.triggered_by.is_empty());
    }

    #[test]
    fn one_critical_signal_dominates_a_low_mean() {
        let c = combine(&scores(0.0, 0.0, 0.95, 0.0), &DetectorConfig::default());
        assert_eq!(c.risk_level, RiskLevel::Critical);
        assert_eq!(c.triggered_by, vec![Signal::Contradiction]);
        assert!(c.weighted_mean < 0.3);
    }

    #[test]
    fn moderate_signals_raise_through_the_mean() {
        // 0.3*0.5 + 0.3*0.5 + 0.25*0.4 + 0.15*0.4 = 0.46
        let c = combine(&scores(0.5, 0.5, 0.4, 0.4), &DetectorConfig::default());
        assert!((c.weighted_mean - 0.46).abs() < 1e-9);
        assert_eq!(c.risk_level, RiskLevel::Medium);
        assert!(c.triggered_by.is_empty());
    }

    #[test]
    fn zero_weights_fall_back_to_single_signals() {
        let mut config = DetectorConfig::default();
        config.weights.confidence = 0.0;
        config.weights.source_consistency = 0.0;
        config.weights.contradiction = 0.0;
        config.weights.terminology = 0.0;
        let c = combine(&scores(0.75, 0.0, 0.0, 0.0), &config);
        assert_eq!(c.weighted_mean, 0.0);
        assert_eq!(c.risk_level, RiskLevel::High);
    }
}
