//! The mutable state behind the aggregator lock.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use vigil_core::config::MetricsConfig;
use vigil_core::models::{EventRecord, Stage};

#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowEntry {
    pub at: DateTime<Utc>,
    pub stage: Stage,
    pub latency_ms: u64,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct AssessmentMark {
    at: DateTime<Utc>,
    flagged: bool,
}

/// Rolling window bounded by count and age. Counters are maintained
/// incrementally so eviction and observation are O(1) amortized.
#[derive(Debug)]
pub(crate) struct Window {
    max_events: usize,
    max_age: Duration,
    qps_secs: i64,
    entries: VecDeque<WindowEntry>,
    stage_counts: BTreeMap<Stage, u64>,
    assessments: VecDeque<AssessmentMark>,
    flagged: u64,
    /// (unix second, events observed in that second), oldest first.
    qps_buckets: VecDeque<(i64, u64)>,
}

/// Data copied out under the lock; everything expensive happens on this.
#[derive(Debug)]
pub(crate) struct WindowCopy {
    pub entries: Vec<WindowEntry>,
    pub stage_counts: BTreeMap<Stage, u64>,
    pub assessed: u64,
    pub flagged: u64,
    pub qps: f64,
}

impl Window {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            max_events: config.window_max_events.max(1),
            max_age: Duration::seconds(config.window_max_age_secs as i64),
            qps_secs: config.qps_window_secs.max(1) as i64,
            entries: VecDeque::new(),
            stage_counts: BTreeMap::new(),
            assessments: VecDeque::new(),
            flagged: 0,
            qps_buckets: VecDeque::new(),
        }
    }

    /// Insert in timestamp order; eviction relies on the oldest being at the
    /// front. In-order samples append at the back.
    pub fn push(&mut self, record: &EventRecord, now: DateTime<Utc>) {
        let pos = self
            .entries
            .iter()
            .rposition(|e| e.at <= now)
            .map_or(0, |i| i + 1);
        self.entries.insert(
            pos,
            WindowEntry {
                at: now,
                stage: record.stage,
                latency_ms: record.latency_ms,
                confidence: record.metadata.confidence(),
            },
        );
        *self.stage_counts.entry(record.stage).or_insert(0) += 1;

        let sec = now.timestamp();
        match self.qps_buckets.iter().rposition(|(s, _)| *s <= sec) {
            Some(i) if self.qps_buckets[i].0 == sec => self.qps_buckets[i].1 += 1,
            Some(i) => self.qps_buckets.insert(i + 1, (sec, 1)),
            None => self.qps_buckets.push_front((sec, 1)),
        }

        while self.entries.len() > self.max_events {
            self.pop_oldest();
        }
        self.evict(now);
    }

    pub fn push_assessment(&mut self, flagged: bool, now: DateTime<Utc>) {
        let pos = self
            .assessments
            .iter()
            .rposition(|a| a.at <= now)
            .map_or(0, |i| i + 1);
        self.assessments.insert(pos, AssessmentMark { at: now, flagged });
        if flagged {
            self.flagged += 1;
        }
        while self.assessments.len() > self.max_events {
            self.pop_oldest_assessment();
        }
        self.evict(now);
    }

    /// Drop everything older than the age bound and stale QPS buckets.
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.max_age;
        while self.entries.front().is_some_and(|e| e.at < cutoff) {
            self.pop_oldest();
        }
        while self.assessments.front().is_some_and(|a| a.at < cutoff) {
            self.pop_oldest_assessment();
        }
        let oldest_sec = now.timestamp() - self.qps_secs;
        while self.qps_buckets.front().is_some_and(|(s, _)| *s <= oldest_sec) {
            self.qps_buckets.pop_front();
        }
    }

    pub fn copy(&self) -> WindowCopy {
        let in_range: u64 = self.qps_buckets.iter().map(|(_, c)| c).sum();
        WindowCopy {
            entries: self.entries.iter().copied().collect(),
            stage_counts: self.stage_counts.clone(),
            assessed: self.assessments.len() as u64,
            flagged: self.flagged,
            qps: in_range as f64 / self.qps_secs as f64,
        }
    }

    fn pop_oldest(&mut self) {
        if let Some(old) = self.entries.pop_front() {
            if let Some(count) = self.stage_counts.get_mut(&old.stage) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.stage_counts.remove(&old.stage);
                }
            }
        }
    }

    fn pop_oldest_assessment(&mut self) {
        if let Some(old) = self.assessments.pop_front() {
            if old.flagged {
                self.flagged = self.flagged.saturating_sub(1);
            }
        }
    }
}
