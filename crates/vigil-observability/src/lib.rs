//! # vigil-observability
//!
//! Live view of the pipeline: the rolling metrics window behind the
//! dashboard, threshold alerts over its snapshots, degradation tracking,
//! component health, and the tracing subscriber setup shared by all crates.

pub mod aggregator;
pub mod alerts;
pub mod degradation;
pub mod health;
pub mod tracing_setup;

pub use aggregator::MetricsAggregator;
pub use alerts::{evaluate_metric_alerts, AlertMetric, MetricAlert};
pub use degradation::{
    evaluate_alerts, AlertLevel, DegradationAlert, DegradationEpisode, DegradationTracker,
};
pub use health::{ComponentHealth, HealthChecker, HealthInputs, HealthReport, HealthStatus};
