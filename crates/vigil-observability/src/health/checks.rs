//! Per-component checks: storage, write path, logger, review.

use super::reporter::{ComponentHealth, HealthInputs, HealthStatus};

pub struct HealthChecker;

impl HealthChecker {
    pub fn check_all(inputs: &HealthInputs) -> Vec<ComponentHealth> {
        vec![
            Self::check_storage(inputs),
            Self::check_write_path(inputs),
            Self::check_logger(inputs),
            Self::check_review(inputs),
        ]
    }

    /// Storage: degraded while buffering without a key, unhealthy once
    /// events are being lost.
    fn check_storage(inputs: &HealthInputs) -> ComponentHealth {
        if inputs.lost_events > 0 {
            ComponentHealth::with(
                "storage",
                HealthStatus::Unhealthy,
                format!("{} events lost", inputs.lost_events),
            )
        } else if inputs.store_degraded {
            ComponentHealth::with(
                "storage",
                HealthStatus::Degraded,
                format!(
                    "encryption key unavailable, {} entries buffered",
                    inputs.degraded_buffered
                ),
            )
        } else {
            ComponentHealth::healthy("storage")
        }
    }

    /// Write path: unhealthy if the writer stopped, degraded above 80% full.
    fn check_write_path(inputs: &HealthInputs) -> ComponentHealth {
        if !inputs.writer_running {
            return ComponentHealth::with(
                "write_path",
                HealthStatus::Unhealthy,
                "writer thread is not running".into(),
            );
        }
        if inputs.queue_capacity > 0 && inputs.queue_depth * 100 / inputs.queue_capacity > 80 {
            return ComponentHealth::with(
                "write_path",
                HealthStatus::Degraded,
                format!(
                    "write queue at {} of {}",
                    inputs.queue_depth, inputs.queue_capacity
                ),
            );
        }
        ComponentHealth::healthy("write_path")
    }

    fn check_logger(inputs: &HealthInputs) -> ComponentHealth {
        if inputs.fallback_count > 0 {
            ComponentHealth::with(
                "logger",
                HealthStatus::Degraded,
                format!("{} fallback-channel entries", inputs.fallback_count),
            )
        } else {
            ComponentHealth::healthy("logger")
        }
    }

    /// Review: degraded while critical items wait.
    fn check_review(inputs: &HealthInputs) -> ComponentHealth {
        if inputs.critical_pending_reviews > 0 {
            ComponentHealth::with(
                "review",
                HealthStatus::Degraded,
                format!(
                    "{} critical items pending of {}",
                    inputs.critical_pending_reviews, inputs.pending_reviews
                ),
            )
        } else {
            ComponentHealth::healthy("review")
        }
    }
}
