use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checks::HealthChecker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub(crate) fn healthy(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }
    }

    pub(crate) fn with(name: &str, status: HealthStatus, message: String) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message),
        }
    }
}

/// Counters gathered from every component at report time.
#[derive(Debug, Clone, Default)]
pub struct HealthInputs {
    /// The store key is unavailable and entries are being buffered.
    pub store_degraded: bool,
    pub degraded_buffered: u64,
    pub lost_events: u64,
    pub queue_depth: usize,
    pub queue_capacity: usize,
    pub writer_running: bool,
    pub fallback_count: u64,
    pub pending_reviews: usize,
    pub critical_pending_reviews: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn build(inputs: &HealthInputs) -> Self {
        let components = HealthChecker::check_all(inputs);
        // Worst component wins.
        let overall = components
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            overall,
            components,
            generated_at: Utc::now(),
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}
