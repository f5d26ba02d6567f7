//! Dynamic entry queries. Only values are bound; column names are fixed.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use vigil_core::errors::StorageError;

use crate::filter::{RecordFilter, TimeRange};
use crate::index_err;

/// Where one entry lives.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub entry_id: String,
    pub segment_id: i64,
    pub base_name: String,
    pub frame_offset: u64,
    pub frame_len: u64,
}

fn where_clause(
    filter: &RecordFilter,
    range: &TimeRange,
    after: Option<(i64, u64)>,
) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(session) = &filter.session_id {
        values.push(Value::Text(session.clone()));
        clauses.push(format!("e.session_id = ?{}", values.len()));
    }
    if let Some(stage) = filter.stage {
        values.push(Value::Text(stage.as_str().to_string()));
        clauses.push(format!("e.stage = ?{}", values.len()));
    }
    if let Some(kind) = filter.kind {
        values.push(Value::Text(kind.as_str().to_string()));
        clauses.push(format!("e.kind = ?{}", values.len()));
    }
    if let Some(from) = range.from {
        values.push(Value::Integer(from.timestamp_millis()));
        clauses.push(format!("e.ts >= ?{}", values.len()));
    }
    if let Some(to) = range.to {
        values.push(Value::Integer(to.timestamp_millis()));
        clauses.push(format!("e.ts < ?{}", values.len()));
    }
    if let Some((segment_id, offset)) = after {
        values.push(Value::Integer(segment_id));
        let seg = values.len();
        values.push(Value::Integer(offset as i64));
        let off = values.len();
        clauses.push(format!(
            "(e.segment_id > ?{seg} OR (e.segment_id = ?{seg} AND e.frame_offset > ?{off}))"
        ));
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (sql, values)
}

pub(crate) fn locate(
    conn: &Connection,
    filter: &RecordFilter,
    range: &TimeRange,
    after: Option<(i64, u64)>,
    limit: Option<usize>,
) -> Result<Vec<LocationRow>, StorageError> {
    let (where_sql, mut values) = where_clause(filter, range, after);
    let mut sql = format!(
        "SELECT e.entry_id, e.segment_id, s.base_name, e.frame_offset, e.frame_len
         FROM entries e JOIN segments s ON s.segment_id = e.segment_id
         {where_sql}
         ORDER BY e.segment_id, e.frame_offset"
    );
    if let Some(limit) = limit {
        values.push(Value::Integer(limit as i64));
        sql.push_str(&format!(" LIMIT ?{}", values.len()));
    }

    let mut stmt = conn.prepare(&sql).map_err(index_err)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok(LocationRow {
                entry_id: row.get(0)?,
                segment_id: row.get(1)?,
                base_name: row.get(2)?,
                frame_offset: row.get::<_, i64>(3)? as u64,
                frame_len: row.get::<_, i64>(4)? as u64,
            })
        })
        .map_err(index_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(index_err)
}

pub(crate) fn count(conn: &Connection, filter: &RecordFilter, range: &TimeRange) -> Result<u64, StorageError> {
    let (where_sql, values) = where_clause(filter, range, None);
    let sql = format!("SELECT COUNT(*) FROM entries e {where_sql}");
    conn.query_row(&sql, params_from_iter(values.iter()), |r| r.get::<_, i64>(0))
        .map(|n| n as u64)
        .map_err(index_err)
}
