//! SQLite index over segment frames: `index.db` next to the segments.

pub mod migrations;
pub mod pragmas;
mod queries;

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StorageError;

use crate::filter::{RecordFilter, TimeRange};
use crate::index_err;
pub use queries::LocationRow;

pub const INDEX_FILE: &str = "index.db";

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub segment_id: i64,
    pub base_name: String,
    pub created_at: i64,
    pub sealed_at: Option<i64>,
    pub compressed_at: Option<i64>,
    pub bytes: i64,
    pub entry_count: i64,
}

impl SegmentRow {
    pub fn is_sealed(&self) -> bool {
        self.sealed_at.is_some()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_at.is_some()
    }
}

/// Location and filter columns of one entry.
#[derive(Debug, Clone)]
pub struct EntryRow<'a> {
    pub entry_id: &'a str,
    pub kind: &'a str,
    pub session_id: &'a str,
    pub stage: Option<&'a str>,
    pub ts_ms: i64,
    pub segment_id: i64,
    pub frame_offset: u64,
    pub frame_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyAggregate {
    pub day: String,
    pub kind: String,
    pub stage: String,
    pub count: u64,
}

#[derive(Debug)]
pub struct IndexDb {
    conn: Connection,
}

impl IndexDb {
    /// Open (or create) the index in `dir` and bring its schema up to date.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(dir.join(INDEX_FILE)).map_err(index_err)?;
        pragmas::apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// A second connection for readers. Schema must already exist.
    pub fn open_reader(dir: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(dir.join(INDEX_FILE)).map_err(index_err)?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // --- segments ---

    pub fn insert_segment(&self, segment_id: i64, base: &str, created_at: i64) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO segments (segment_id, base_name, created_at) VALUES (?1, ?2, ?3)",
                params![segment_id, base, created_at],
            )
            .map_err(index_err)?;
        Ok(())
    }

    pub fn seal_segment(&self, segment_id: i64, sealed_at: i64) -> Result<(), StorageError> {
        self.conn
            .execute(
                "UPDATE segments SET sealed_at = ?2 WHERE segment_id = ?1 AND sealed_at IS NULL",
                params![segment_id, sealed_at],
            )
            .map_err(index_err)?;
        Ok(())
    }

    pub fn mark_compressed(&self, segment_id: i64, at: i64, bytes: u64) -> Result<(), StorageError> {
        self.conn
            .execute(
                "UPDATE segments SET compressed_at = ?2, bytes = ?3 WHERE segment_id = ?1",
                params![segment_id, at, bytes as i64],
            )
            .map_err(index_err)?;
        Ok(())
    }

    pub fn segments(&self) -> Result<Vec<SegmentRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT segment_id, base_name, created_at, sealed_at, compressed_at, bytes, entry_count
                 FROM segments ORDER BY segment_id",
            )
            .map_err(index_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SegmentRow {
                    segment_id: row.get(0)?,
                    base_name: row.get(1)?,
                    created_at: row.get(2)?,
                    sealed_at: row.get(3)?,
                    compressed_at: row.get(4)?,
                    bytes: row.get(5)?,
                    entry_count: row.get(6)?,
                })
            })
            .map_err(index_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(index_err)
    }

    pub fn max_segment_id(&self) -> Result<i64, StorageError> {
        self.conn
            .query_row("SELECT COALESCE(MAX(segment_id), 0) FROM segments", [], |r| r.get(0))
            .map_err(index_err)
    }

    /// Remove a segment and its entry rows. Returns the entry rows removed.
    pub fn delete_segment(&self, segment_id: i64) -> Result<u64, StorageError> {
        let tx = self.conn.unchecked_transaction().map_err(index_err)?;
        let removed = tx
            .execute("DELETE FROM entries WHERE segment_id = ?1", params![segment_id])
            .map_err(index_err)?;
        tx.execute("DELETE FROM segments WHERE segment_id = ?1", params![segment_id])
            .map_err(index_err)?;
        tx.commit().map_err(index_err)?;
        Ok(removed as u64)
    }

    // --- entries ---

    pub fn entry_exists(&self, entry_id: &str) -> Result<bool, StorageError> {
        self.conn
            .query_row(
                "SELECT 1 FROM entries WHERE entry_id = ?1",
                params![entry_id],
                |_| Ok(()),
            )
            .optional()
            .map(|r| r.is_some())
            .map_err(index_err)
    }

    /// Index one entry and bump its segment counters and daily aggregate in
    /// one transaction.
    pub fn insert_entry(&self, row: &EntryRow<'_>, day: &str) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction().map_err(index_err)?;
        tx.execute(
            "INSERT INTO entries (entry_id, kind, session_id, stage, ts, segment_id, frame_offset, frame_len)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row.entry_id,
                row.kind,
                row.session_id,
                row.stage,
                row.ts_ms,
                row.segment_id,
                row.frame_offset as i64,
                row.frame_len as i64,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::DuplicateEntry {
                    entry_id: row.entry_id.to_string(),
                }
            }
            other => index_err(other),
        })?;
        tx.execute(
            "UPDATE segments SET entry_count = entry_count + 1, bytes = ?2 WHERE segment_id = ?1",
            params![
                row.segment_id,
                (row.frame_offset + crate::segment::LEN_PREFIX as u64 + row.frame_len) as i64
            ],
        )
        .map_err(index_err)?;
        tx.execute(
            "INSERT INTO daily_aggregates (day, kind, stage, count) VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(day, kind, stage) DO UPDATE SET count = count + 1",
            params![day, row.kind, row.stage.unwrap_or("")],
        )
        .map_err(index_err)?;
        tx.commit().map_err(index_err)
    }

    pub fn entry_count(&self) -> Result<u64, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(index_err)
    }

    /// Entry locations matching the filter, in append order, strictly after
    /// `after` when given.
    pub fn locate(
        &self,
        filter: &RecordFilter,
        range: &TimeRange,
        after: Option<(i64, u64)>,
        limit: Option<usize>,
    ) -> Result<Vec<LocationRow>, StorageError> {
        queries::locate(&self.conn, filter, range, after, limit)
    }

    pub fn count_matching(&self, filter: &RecordFilter, range: &TimeRange) -> Result<u64, StorageError> {
        queries::count(&self.conn, filter, range)
    }

    // --- aggregates & retention log ---

    pub fn prune_aggregates(&self, before_day: &str) -> Result<u64, StorageError> {
        self.conn
            .execute("DELETE FROM daily_aggregates WHERE day < ?1", params![before_day])
            .map(|n| n as u64)
            .map_err(index_err)
    }

    pub fn daily_aggregates(&self, since_day: &str) -> Result<Vec<DailyAggregate>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT day, kind, stage, count FROM daily_aggregates
                 WHERE day >= ?1 ORDER BY day, kind, stage",
            )
            .map_err(index_err)?;
        let rows = stmt
            .query_map(params![since_day], |row| {
                Ok(DailyAggregate {
                    day: row.get(0)?,
                    kind: row.get(1)?,
                    stage: row.get(2)?,
                    count: row.get::<_, i64>(3)? as u64,
                })
            })
            .map_err(index_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(index_err)
    }

    pub fn log_retention(
        &self,
        base: &str,
        tier: &str,
        entries: u64,
        bytes: u64,
        deleted_at: i64,
    ) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO retention_log (base_name, tier, entries, bytes, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![base, tier, entries as i64, bytes as i64, deleted_at],
            )
            .map_err(index_err)?;
        Ok(())
    }

    pub fn retention_log_len(&self) -> Result<u64, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM retention_log", [], |r| r.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(index_err)
    }
}
