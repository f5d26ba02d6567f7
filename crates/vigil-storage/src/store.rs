//! [`SecureLogStore`]: single-writer owner of segments and index.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::config::StorageConfig;
use vigil_core::constants::SYSTEM_SESSION_ID;
use vigil_core::errors::{StorageError, VigilResult};
use vigil_core::models::{EventRecord, StoredEntry};

use crate::crypto::{self, KeyProvider, StoreKey};
use crate::filter::{RecordFilter, TimeRange};
use crate::gauges::{StoreGauges, StoreStats};
use crate::index::{DailyAggregate, EntryRow, IndexDb};
use crate::pagination::PaginatedResult;
use crate::reader::{self, StoreReader};
use crate::retention::{PurgedSegment, RetentionPolicy, RetentionReport};
use crate::segment::{self, ActiveSegment, LEN_PREFIX};

/// Where an appended entry landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    pub entry_id: String,
    pub segment_id: i64,
    pub frame_offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompactionReport {
    pub segments: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

pub struct SecureLogStore {
    dir: PathBuf,
    config: StorageConfig,
    keys: Arc<dyn KeyProvider>,
    index: IndexDb,
    active: Option<ActiveSegment>,
    degraded: VecDeque<StoredEntry>,
    gauges: Arc<StoreGauges>,
    bytes_on_disk: u64,
    next_segment_id: i64,
    system_seq: u32,
}

impl SecureLogStore {
    /// Open the store in `config.dir`, creating it if needed. Segments left
    /// unsealed by a previous process are sealed.
    pub fn open(config: &StorageConfig, keys: Arc<dyn KeyProvider>) -> Result<Self, StorageError> {
        let dir = PathBuf::from(&config.dir);
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io("create store dir", e))?;
        let index = IndexDb::open(&dir)?;

        let now_ms = Utc::now().timestamp_millis();
        for seg in index.segments()?.iter().filter(|s| !s.is_sealed()) {
            index.seal_segment(seg.segment_id, now_ms)?;
            tracing::info!(
                event = "segment_recovered",
                segment = %seg.base_name,
                "sealed segment left open by a previous process"
            );
        }

        let bytes_on_disk =
            segment::disk_usage(&dir).map_err(|e| StorageError::io("scan segments", e))?;
        let next_segment_id = index.max_segment_id()? + 1;
        let system_seq = index.count_matching(&RecordFilter::session(SYSTEM_SESSION_ID), &TimeRange::all())? as u32;

        let gauges = Arc::new(StoreGauges::default());
        gauges.set_bytes(bytes_on_disk);

        tracing::info!(
            event = "store_opened",
            dir = %dir.display(),
            bytes_on_disk = bytes_on_disk,
            next_segment_id = next_segment_id,
            "secure log store opened"
        );

        Ok(Self {
            dir,
            config: config.clone(),
            keys,
            index,
            active: None,
            degraded: VecDeque::new(),
            gauges,
            bytes_on_disk,
            next_segment_id,
            system_seq,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn gauges(&self) -> Arc<StoreGauges> {
        Arc::clone(&self.gauges)
    }

    /// A reader with its own index connection.
    pub fn reader(&self) -> Result<StoreReader, StorageError> {
        StoreReader::open(&self.dir, Arc::clone(&self.keys))
    }

    // --- write path ---

    /// Append one entry. Entries buffered while the key was unavailable are
    /// written first, in order.
    pub fn append(&mut self, entry: StoredEntry) -> Result<EntryLocation, StorageError> {
        let key = match self.keys.current_key() {
            Ok(key) => key,
            Err(cause) => return Err(self.buffer_degraded(entry, cause)),
        };
        self.flush_buffer_with(&key)?;
        self.write_entry(&key, &entry)
    }

    /// Write out the degraded-mode buffer if the key is back. Returns the
    /// number of entries written.
    pub fn flush_degraded(&mut self) -> Result<usize, StorageError> {
        if self.degraded.is_empty() {
            return Ok(0);
        }
        let key = self.keys.current_key().map_err(|e| {
            self.gauges.set_key_unavailable(true);
            StorageError::EncryptionKeyUnavailable {
                reason: key_reason(e),
                buffered: true,
            }
        })?;
        self.flush_buffer_with(&key)
    }

    pub fn degraded_len(&self) -> usize {
        self.degraded.len()
    }

    fn buffer_degraded(&mut self, entry: StoredEntry, cause: StorageError) -> StorageError {
        let reason = key_reason(cause);
        if !self.gauges.is_degraded() {
            tracing::warn!(
                event = "store_degraded",
                reason = %reason,
                "encryption key unavailable, buffering entries"
            );
        }
        self.gauges.set_key_unavailable(true);

        let buffered = self.degraded.len() < self.config.degraded_buffer_capacity;
        if buffered {
            self.degraded.push_back(entry);
        } else {
            self.gauges.add_lost(1);
            tracing::error!(
                event = "degraded_buffer_overflow",
                entry_id = %entry.entry_id(),
                capacity = self.config.degraded_buffer_capacity,
                "degraded buffer full, entry dropped"
            );
        }
        self.gauges.set_buffered(self.degraded.len());
        StorageError::EncryptionKeyUnavailable { reason, buffered }
    }

    fn flush_buffer_with(&mut self, key: &StoreKey) -> Result<usize, StorageError> {
        if self.gauges.is_degraded() {
            self.gauges.set_key_unavailable(false);
            tracing::info!(
                event = "store_recovered",
                buffered = self.degraded.len(),
                "encryption key available again"
            );
        }

        let mut flushed = 0;
        while let Some(entry) = self.degraded.pop_front() {
            match self.write_entry(key, &entry) {
                Ok(_) => flushed += 1,
                Err(StorageError::DuplicateEntry { entry_id }) => {
                    tracing::warn!(event = "duplicate_skipped", entry_id = %entry_id, "buffered entry already stored");
                }
                Err(e) => {
                    self.degraded.push_front(entry);
                    self.gauges.set_buffered(self.degraded.len());
                    return Err(e);
                }
            }
        }
        self.gauges.set_buffered(0);
        Ok(flushed)
    }

    fn write_entry(&mut self, key: &StoreKey, entry: &StoredEntry) -> Result<EntryLocation, StorageError> {
        let entry_id = entry.entry_id();
        if self.index.entry_exists(&entry_id)? {
            return Err(StorageError::DuplicateEntry { entry_id });
        }

        let plaintext = serde_json::to_vec(entry).map_err(|e| StorageError::Serialization {
            reason: e.to_string(),
        })?;
        let body = crypto::seal(key, &plaintext)?;
        let frame_bytes = (LEN_PREFIX + body.len()) as u64;

        if let Some(limit) = self.config.max_store_bytes {
            if self.bytes_on_disk + frame_bytes > limit {
                return Err(StorageError::DiskFull {
                    used: self.bytes_on_disk,
                    limit,
                });
            }
        }

        self.rotate_if_due()?;
        let active = self.ensure_active()?;
        let segment_id = active.segment_id;
        let frame_offset = match active.write_frame(&body) {
            Ok(offset) => offset,
            Err(e) => {
                if active.is_poisoned() {
                    self.retire_poisoned()?;
                }
                return Err(e);
            }
        };
        self.bytes_on_disk += frame_bytes;
        self.gauges.set_bytes(self.bytes_on_disk);

        let timestamp = entry.timestamp();
        self.index.insert_entry(
            &EntryRow {
                entry_id: &entry_id,
                kind: entry.kind().as_str(),
                session_id: entry.session_id(),
                stage: entry.stage().map(|s| s.as_str()),
                ts_ms: timestamp.timestamp_millis(),
                segment_id,
                frame_offset,
                frame_len: body.len() as u64,
            },
            &timestamp.format("%Y-%m-%d").to_string(),
        )?;
        self.gauges.add_written(1);

        Ok(EntryLocation {
            entry_id,
            segment_id,
            frame_offset,
        })
    }

    fn ensure_active(&mut self) -> Result<&mut ActiveSegment, StorageError> {
        let active = match self.active.take() {
            Some(active) => active,
            None => {
                let segment_id = self.next_segment_id;
                let created_at = Utc::now().timestamp_millis();
                let active = ActiveSegment::create(&self.dir, segment_id, created_at)?;
                self.index.insert_segment(segment_id, &active.base, created_at)?;
                self.next_segment_id += 1;
                tracing::debug!(event = "segment_opened", segment = %active.base, "opened segment");
                active
            }
        };
        Ok(self.active.insert(active))
    }

    /// Seal a segment that holds a partial frame so the next append opens a
    /// new one. Entries already indexed in it stay readable.
    fn retire_poisoned(&mut self) -> Result<(), StorageError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        self.index
            .seal_segment(active.segment_id, Utc::now().timestamp_millis())?;
        tracing::warn!(
            event = "segment_retired",
            segment = %active.base,
            entries = active.entries(),
            "segment retired after a partial write"
        );
        Ok(())
    }

    // --- maintenance ---

    /// Rotate if the active segment exceeds its size or age bound.
    pub fn rotate_if_due(&mut self) -> Result<bool, StorageError> {
        let due = self.active.as_ref().is_some_and(|a| {
            a.entries() > 0
                && (a.bytes() >= self.config.segment_max_bytes
                    || a.age_secs() >= self.config.segment_max_age_secs)
        });
        if due {
            self.rotate()
        } else {
            Ok(false)
        }
    }

    /// Seal the active segment. A no-op when there is no active segment or it
    /// holds no entries, so repeated calls are harmless.
    pub fn rotate(&mut self) -> Result<bool, StorageError> {
        let Some(mut active) = self.active.take() else {
            return Ok(false);
        };
        if active.entries() == 0 {
            self.active = Some(active);
            return Ok(false);
        }
        if let Err(e) = active.sync() {
            self.active = Some(active);
            return Err(e);
        }
        self.index
            .seal_segment(active.segment_id, Utc::now().timestamp_millis())?;
        tracing::info!(
            event = "segment_rotated",
            segment = %active.base,
            bytes = active.bytes(),
            entries = active.entries(),
            "segment sealed"
        );
        Ok(true)
    }

    /// zstd-compress every sealed, uncompressed segment.
    pub fn compact(&mut self) -> Result<CompactionReport, StorageError> {
        let mut report = CompactionReport::default();
        for seg in self.index.segments()? {
            if !seg.is_sealed() || seg.is_compressed() {
                continue;
            }
            let raw_path = segment::raw_path(&self.dir, &seg.base_name);
            let raw = match std::fs::read(&raw_path) {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(event = "segment_missing", segment = %seg.base_name, "sealed segment file missing");
                    continue;
                }
                Err(e) => return Err(StorageError::io("read segment", e)),
            };
            let compressed = zstd::encode_all(raw.as_slice(), self.config.compression_level)
                .map_err(|e| StorageError::io("compress segment", e))?;

            let target = segment::compressed_path(&self.dir, &seg.base_name);
            let tmp = target.with_extension("zst.tmp");
            std::fs::write(&tmp, &compressed).map_err(|e| StorageError::io("write compacted segment", e))?;
            std::fs::rename(&tmp, &target).map_err(|e| StorageError::io("publish compacted segment", e))?;
            self.index
                .mark_compressed(seg.segment_id, Utc::now().timestamp_millis(), compressed.len() as u64)?;
            std::fs::remove_file(&raw_path).map_err(|e| StorageError::io("remove raw segment", e))?;

            self.bytes_on_disk = self
                .bytes_on_disk
                .saturating_sub(raw.len() as u64)
                .saturating_add(compressed.len() as u64);
            report.segments += 1;
            report.bytes_before += raw.len() as u64;
            report.bytes_after += compressed.len() as u64;
        }
        self.gauges.set_bytes(self.bytes_on_disk);
        if report.segments > 0 {
            tracing::info!(
                event = "segments_compacted",
                segments = report.segments,
                bytes_before = report.bytes_before,
                bytes_after = report.bytes_after,
                "compaction pass finished"
            );
        }
        Ok(report)
    }

    pub fn apply_retention(&mut self, policy: &RetentionPolicy) -> Result<RetentionReport, StorageError> {
        self.apply_retention_at(policy, Utc::now())
    }

    /// Retention pass as of `now`. Each purged segment is audited in the
    /// index and as a `security` event under the system session.
    pub fn apply_retention_at(
        &mut self,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
    ) -> Result<RetentionReport, StorageError> {
        let start = Instant::now();
        let mut report = RetentionReport::default();

        for seg in self.index.segments()? {
            let Some(tier) = policy.expired_tier(&seg, now) else {
                continue;
            };
            let mut freed = 0u64;
            for path in [
                segment::raw_path(&self.dir, &seg.base_name),
                segment::compressed_path(&self.dir, &seg.base_name),
            ] {
                match std::fs::metadata(&path) {
                    Ok(meta) => {
                        std::fs::remove_file(&path).map_err(|e| StorageError::io("purge segment", e))?;
                        freed += meta.len();
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(StorageError::io("stat segment", e)),
                }
            }
            let entries = self.index.delete_segment(seg.segment_id)?;
            self.index
                .log_retention(&seg.base_name, &tier.to_string(), entries, freed, now.timestamp_millis())?;
            self.bytes_on_disk = self.bytes_on_disk.saturating_sub(freed);

            tracing::warn!(
                event = "retention_purge",
                segment = %seg.base_name,
                tier = %tier,
                entries = entries,
                bytes = freed,
                "segment irreversibly deleted by retention"
            );
            report.entries_deleted += entries;
            report.purged.push(PurgedSegment {
                segment: seg.base_name,
                tier,
                entries,
                bytes: freed,
            });
        }
        self.gauges.set_bytes(self.bytes_on_disk);

        report.aggregates_pruned = self
            .index
            .prune_aggregates(&policy.aggregate_cutoff_day(now))?;

        for purged in &report.purged {
            let detail = format!(
                "segment={} tier={} entries={} bytes={}",
                purged.segment, purged.tier, purged.entries, purged.bytes
            );
            let record = EventRecord::system_security(self.system_seq, "retention_purge", detail);
            self.system_seq += 1;
            // Buffered in degraded mode; the purge itself already happened.
            if let Err(e) = self.append(StoredEntry::Event(record)) {
                tracing::warn!(event = "retention_audit_deferred", error = %e, "retention security event not written yet");
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// fsync the active segment.
    pub fn sync(&mut self) -> Result<(), StorageError> {
        match self.active.as_mut() {
            Some(active) => active.sync(),
            None => Ok(()),
        }
    }

    /// Seal the active segment and sync. Used on shutdown.
    pub fn close(&mut self) -> Result<(), StorageError> {
        self.sync()?;
        self.rotate().map(|_| ())
    }

    // --- read path ---

    pub fn query(&self, filter: &RecordFilter, range: &TimeRange) -> Result<Vec<StoredEntry>, StorageError> {
        reader::query_all(&self.index, &self.dir, self.keys.as_ref(), filter, range)
    }

    pub fn query_page(
        &self,
        filter: &RecordFilter,
        range: &TimeRange,
        cursor: Option<&str>,
        limit: usize,
    ) -> VigilResult<PaginatedResult<StoredEntry>> {
        reader::query_page(&self.index, &self.dir, self.keys.as_ref(), filter, range, cursor, limit)
    }

    pub fn daily_aggregates(&self, since_day: &str) -> Result<Vec<DailyAggregate>, StorageError> {
        self.index.daily_aggregates(since_day)
    }

    pub fn retention_log_len(&self) -> Result<u64, StorageError> {
        self.index.retention_log_len()
    }

    pub fn stats(&self) -> Result<StoreStats, StorageError> {
        let segments = self.index.segments()?;
        Ok(StoreStats {
            segments: segments.len() as u64,
            sealed_segments: segments.iter().filter(|s| s.is_sealed()).count() as u64,
            compressed_segments: segments.iter().filter(|s| s.is_compressed()).count() as u64,
            entries: self.index.entry_count()?,
            bytes_on_disk: self.bytes_on_disk,
            active_segment: self.active.as_ref().map(|a| a.base.clone()),
            degraded: self.gauges.is_degraded(),
            degraded_buffered: self.degraded.len() as u64,
            lost_events: self.gauges.lost_events(),
        })
    }
}

fn key_reason(err: StorageError) -> String {
    match err {
        StorageError::EncryptionKeyUnavailable { reason, .. } => reason,
        other => other.to_string(),
    }
}
