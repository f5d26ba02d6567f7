use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Stage;

/// Latency distribution of one stage within the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub count: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
    pub max_ms: u64,
}

/// Point-in-time view of the rolling metrics window. Ephemeral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub taken_at: DateTime<Utc>,
    /// Events currently inside the window.
    pub window_events: u64,
    /// `query` events in the window.
    pub total_requests: u64,
    /// `response` events in the window.
    pub success_count: u64,
    /// `error` events in the window.
    pub error_count: u64,
    pub error_rate: f64,
    pub stage_counts: BTreeMap<Stage, u64>,
    pub latency: BTreeMap<Stage, LatencyPercentiles>,
    pub qps: f64,
    pub mean_confidence: Option<f64>,
    pub assessed_count: u64,
    pub flagged_count: u64,
    pub flag_rate: f64,
    /// Events observed since start, regardless of window eviction.
    pub total_recorded: u64,
    /// Events dropped by the durable write path since start.
    pub lost_events: u64,
}

impl MetricSnapshot {
    pub fn stage_count(&self, stage: Stage) -> u64 {
        self.stage_counts.get(&stage).copied().unwrap_or(0)
    }

    /// End-to-end latency, measured on `response` events.
    pub fn end_to_end(&self) -> LatencyPercentiles {
        self.latency.get(&Stage::Response).copied().unwrap_or_default()
    }
}
