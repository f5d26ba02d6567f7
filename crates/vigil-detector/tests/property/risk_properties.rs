use proptest::prelude::*;
use vigil_core::config::DetectorConfig;
use vigil_core::models::{Signal, SignalScores};
use vigil_detector::combine;

fn scores() -> impl Strategy<Value = SignalScores> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64).prop_map(|(c, s, x, t)| {
        SignalScores {
            confidence: c,
            source_consistency: s,
            contradiction: x,
            terminology: t,
        }
    })
}

proptest! {
    #[test]
    fn risk_is_monotone_in_each_signal(base in scores(), idx in 0usize..4, bump in 0.0..=1.0f64) {
        let config = DetectorConfig::default();
        let signal = Signal::ALL[idx];
        let mut raised = base;
        raised.set(signal, base.get(signal) + bump);

        let before = combine(&base, &config);
        let after = combine(&raised, &config);
        prop_assert!(after.risk_level >= before.risk_level);
        prop_assert!(after.weighted_mean >= before.weighted_mean - 1e-12);
    }

    #[test]
    fn weighted_mean_stays_in_unit_range(s in scores()) {
        let c = combine(&s, &DetectorConfig::default());
        prop_assert!((0.0..=1.0).contains(&c.weighted_mean));
    }

    #[test]
    fn triggered_signals_alone_reach_high(s in scores()) {
        let config = DetectorConfig::default();
        let c = combine(&s, &config);
        for signal in c.triggered_by {
            prop_assert!(s.get(signal) >= config.thresholds(signal).high);
        }
    }
}
