//! Read path: locate entries through the index, then decrypt their frames.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vigil_core::constants::MAX_PAGE_SIZE;
use vigil_core::errors::{StorageError, VigilError, VigilResult};
use vigil_core::models::StoredEntry;

use crate::crypto::{self, KeyProvider, StoreKey};
use crate::filter::{RecordFilter, TimeRange};
use crate::index::{IndexDb, LocationRow};
use crate::pagination::{PaginatedResult, PaginationCursor};
use crate::segment::{read_body, FrameSource};

/// Query handle with its own index connection, usable from any thread
/// while the writer thread appends.
pub struct StoreReader {
    dir: PathBuf,
    index: Mutex<IndexDb>,
    keys: Arc<dyn KeyProvider>,
}

impl StoreReader {
    pub fn open(dir: &Path, keys: Arc<dyn KeyProvider>) -> Result<Self, StorageError> {
        Ok(Self {
            dir: dir.to_path_buf(),
            index: Mutex::new(IndexDb::open_reader(dir)?),
            keys,
        })
    }

    /// Every matching entry in append order.
    pub fn query(&self, filter: &RecordFilter, range: &TimeRange) -> VigilResult<Vec<StoredEntry>> {
        let index = self.index.lock().unwrap_or_else(|p| p.into_inner());
        Ok(query_all(&index, &self.dir, self.keys.as_ref(), filter, range)?)
    }

    pub fn query_page(
        &self,
        filter: &RecordFilter,
        range: &TimeRange,
        cursor: Option<&str>,
        limit: usize,
    ) -> VigilResult<PaginatedResult<StoredEntry>> {
        let index = self.index.lock().unwrap_or_else(|p| p.into_inner());
        query_page(&index, &self.dir, self.keys.as_ref(), filter, range, cursor, limit)
    }
}

pub(crate) fn query_all(
    index: &IndexDb,
    dir: &Path,
    keys: &dyn KeyProvider,
    filter: &RecordFilter,
    range: &TimeRange,
) -> Result<Vec<StoredEntry>, StorageError> {
    let rows = index.locate(filter, range, None, None)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    load(dir, &keys.current_key()?, &rows)
}

pub(crate) fn query_page(
    index: &IndexDb,
    dir: &Path,
    keys: &dyn KeyProvider,
    filter: &RecordFilter,
    range: &TimeRange,
    cursor: Option<&str>,
    limit: usize,
) -> VigilResult<PaginatedResult<StoredEntry>> {
    let after = match cursor {
        Some(raw) => Some(
            PaginationCursor::decode(raw)
                .ok_or_else(|| VigilError::validation("malformed pagination cursor"))?
                .key(),
        ),
        None => None,
    };
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut rows = index.locate(filter, range, after, Some(limit + 1))?;
    let has_more = rows.len() > limit;
    rows.truncate(limit);
    let next_cursor = if has_more {
        rows.last().map(|r| {
            PaginationCursor {
                segment_id: r.segment_id,
                frame_offset: r.frame_offset,
            }
            .encode()
        })
    } else {
        None
    };

    let items = if rows.is_empty() {
        Vec::new()
    } else {
        load(dir, &keys.current_key()?, &rows)?
    };
    Ok(PaginatedResult {
        items,
        total: index.count_matching(filter, range)?,
        has_more,
        next_cursor,
    })
}

/// Decrypt the frames behind `rows`, opening each segment once. Rows of a
/// segment purged since the index lookup are skipped.
fn load(dir: &Path, key: &StoreKey, rows: &[LocationRow]) -> Result<Vec<StoredEntry>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut current: Option<(i64, Option<FrameSource>)> = None;

    for row in rows {
        if current.as_ref().map(|(id, _)| *id) != Some(row.segment_id) {
            current = Some((row.segment_id, FrameSource::open(dir, &row.base_name)?));
        }
        let Some((_, Some(source))) = current.as_mut() else {
            continue;
        };
        let body = read_body(source, &row.base_name, row.frame_offset, row.frame_len)?;
        let plaintext = crypto::open(key, &body)?;
        let entry: StoredEntry =
            serde_json::from_slice(&plaintext).map_err(|e| StorageError::Corruption {
                segment: row.base_name.clone(),
                details: format!("entry {} does not decode: {e}", row.entry_id),
            })?;
        out.push(entry);
    }
    Ok(out)
}
