//! [`MetricsAggregator`]: the live dashboard window.
//!
//! One mutex guards the window; observation does O(1) amortized work under
//! it. Snapshots copy the window under the lock and compute percentiles on
//! the copy after releasing it, so readers never stall writers for longer
//! than a memcpy.

mod percentiles;
mod window;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use vigil_core::config::MetricsConfig;
use vigil_core::errors::VigilResult;
use vigil_core::models::{EventRecord, HallucinationAssessment, MetricSnapshot, Stage};
use vigil_core::traits::IEventObserver;

pub use percentiles::summarize;
use window::Window;

/// Rolling-window metrics over observed events and assessments.
#[derive(Debug)]
pub struct MetricsAggregator {
    window: Mutex<Window>,
    total_recorded: AtomicU64,
    lost_events: AtomicU64,
}

impl MetricsAggregator {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            window: Mutex::new(Window::new(config)),
            total_recorded: AtomicU64::new(0),
            lost_events: AtomicU64::new(0),
        }
    }

    /// Observe an event as of `now`. Samples may arrive out of order.
    pub fn observe_at(&self, record: &EventRecord, now: DateTime<Utc>) {
        let mut window = self.lock();
        self.push_locked(&mut window, record, now);
    }

    /// Count one completed assessment as of `now`.
    pub fn observe_assessment_at(&self, flagged: bool, now: DateTime<Utc>) {
        self.lock().push_assessment(flagged, now);
    }

    fn push_locked(&self, window: &mut Window, record: &EventRecord, now: DateTime<Utc>) {
        window.push(record, now);
        // Bumped under the lock so a snapshot never sees a window entry the
        // lifetime counter does not account for.
        self.total_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `n` events the durable path dropped.
    pub fn record_lost(&self, n: u64) {
        if n > 0 {
            self.lost_events.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Mirror an absolute loss count reported by storage. Never decreases.
    pub fn set_lost_events(&self, n: u64) {
        self.lost_events.fetch_max(n, Ordering::Relaxed);
    }

    pub fn lost_events(&self) -> u64 {
        self.lost_events.load(Ordering::Relaxed)
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        self.snapshot_at(Utc::now())
    }

    /// Snapshot of the window as of `now`.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> MetricSnapshot {
        let (copy, total_recorded) = {
            let mut window = self.lock();
            window.evict(now);
            (window.copy(), self.total_recorded.load(Ordering::Relaxed))
        };

        let mut per_stage: BTreeMap<Stage, Vec<u64>> = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut confidence_n = 0u64;
        for entry in &copy.entries {
            per_stage.entry(entry.stage).or_default().push(entry.latency_ms);
            if let Some(c) = entry.confidence.filter(|c| c.is_finite()) {
                confidence_sum += c;
                confidence_n += 1;
            }
        }
        let latency = per_stage
            .into_iter()
            .map(|(stage, mut v)| (stage, summarize(&mut v)))
            .collect();

        let count = |stage: Stage| copy.stage_counts.get(&stage).copied().unwrap_or(0);
        let total_requests = count(Stage::Query);
        let success_count = count(Stage::Response);
        let error_count = count(Stage::Error);

        MetricSnapshot {
            taken_at: now,
            window_events: copy.entries.len() as u64,
            total_requests,
            success_count,
            error_count,
            error_rate: ratio(error_count, total_requests),
            stage_counts: copy.stage_counts,
            latency,
            qps: copy.qps,
            mean_confidence: (confidence_n > 0).then(|| confidence_sum / confidence_n as f64),
            assessed_count: copy.assessed,
            flagged_count: copy.flagged,
            flag_rate: ratio(copy.flagged, copy.assessed),
            total_recorded,
            lost_events: self.lost_events(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        // A panic while holding the lock leaves counters consistent; keep going.
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IEventObserver for MetricsAggregator {
    // Timestamps are taken under the lock so live samples arrive in order.
    fn observe(&self, record: &EventRecord) -> VigilResult<()> {
        let mut window = self.lock();
        self.push_locked(&mut window, record, Utc::now());
        Ok(())
    }

    fn observe_assessment(&self, assessment: &HallucinationAssessment) -> VigilResult<()> {
        let mut window = self.lock();
        window.push_assessment(assessment.flagged, Utc::now());
        Ok(())
    }
}

/// `part / whole`, 0 for an empty whole, clamped to [0, 1].
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).min(1.0)
    }
}
