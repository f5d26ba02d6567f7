//! Degradation episodes per component and the alerts derived from them.

pub mod alerting;
pub mod tracker;

pub use alerting::{evaluate_alerts, AlertLevel, DegradationAlert};
pub use tracker::{DegradationEpisode, DegradationTracker};
