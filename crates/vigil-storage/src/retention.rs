//! Retention tiers for the secure log store.
//!
//! - **Raw** (default 30 days): sealed segments that were never compacted.
//! - **Compressed** (default 90 days): compacted `.log.zst` segments.
//! - **Aggregate** (default 365 days): `daily_aggregates` rows.
//!
//! Ages are measured from segment creation. The active segment is never a
//! candidate. Every deletion is irreversible and audited.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use vigil_core::config::StorageConfig;

use crate::index::SegmentRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub raw_days: u32,
    pub compressed_days: u32,
    pub aggregate_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

impl RetentionPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            raw_days: config.raw_retention_days,
            compressed_days: config.compressed_retention_days,
            aggregate_days: config.aggregate_retention_days,
        }
    }

    /// The tier under which `segment` has expired at `now`, if any.
    pub fn expired_tier(&self, segment: &SegmentRow, now: DateTime<Utc>) -> Option<RetentionTier> {
        if !segment.is_sealed() {
            return None;
        }
        let (tier, days) = if segment.is_compressed() {
            (RetentionTier::Compressed, self.compressed_days)
        } else {
            (RetentionTier::Raw, self.raw_days)
        };
        let cutoff = (now - Duration::days(days as i64)).timestamp_millis();
        (segment.created_at < cutoff).then_some(tier)
    }

    /// First day (`YYYY-MM-DD`) whose aggregates are kept.
    pub fn aggregate_cutoff_day(&self, now: DateTime<Utc>) -> String {
        (now - Duration::days(self.aggregate_days as i64))
            .format("%Y-%m-%d")
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionTier {
    Raw,
    Compressed,
}

impl fmt::Display for RetentionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RetentionTier::Raw => "raw",
            RetentionTier::Compressed => "compressed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgedSegment {
    pub segment: String,
    pub tier: RetentionTier,
    pub entries: u64,
    pub bytes: u64,
}

/// What a retention pass deleted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    pub purged: Vec<PurgedSegment>,
    pub entries_deleted: u64,
    pub aggregates_pruned: u64,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(age_days: i64, sealed: bool, compressed: bool) -> SegmentRow {
        let created = (Utc::now() - Duration::days(age_days)).timestamp_millis();
        SegmentRow {
            segment_id: 1,
            base_name: "seg".into(),
            created_at: created,
            sealed_at: sealed.then_some(created),
            compressed_at: compressed.then_some(created),
            bytes: 0,
            entry_count: 0,
        }
    }

    #[test]
    fn raw_segments_expire_after_thirty_days() {
        let policy = RetentionPolicy::default();
        let now = Utc::now();
        assert_eq!(policy.expired_tier(&segment(31, true, false), now), Some(RetentionTier::Raw));
        assert_eq!(policy.expired_tier(&segment(29, true, false), now), None);
    }

    #[test]
    fn compressed_segments_live_ninety_days() {
        let policy = RetentionPolicy::default();
        let now = Utc::now();
        assert_eq!(policy.expired_tier(&segment(31, true, true), now), None);
        assert_eq!(
            policy.expired_tier(&segment(91, true, true), now),
            Some(RetentionTier::Compressed)
        );
    }

    #[test]
    fn active_segment_is_never_expired() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.expired_tier(&segment(400, false, false), Utc::now()), None);
    }
}
