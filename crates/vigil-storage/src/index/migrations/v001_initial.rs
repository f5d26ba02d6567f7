//! Segments, entry locations and daily aggregates.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS segments (
    segment_id    INTEGER PRIMARY KEY,
    base_name     TEXT NOT NULL UNIQUE,
    created_at    INTEGER NOT NULL,
    sealed_at     INTEGER,
    compressed_at INTEGER,
    bytes         INTEGER NOT NULL DEFAULT 0,
    entry_count   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS entries (
    entry_id     TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,
    session_id   TEXT NOT NULL,
    stage        TEXT,
    ts           INTEGER NOT NULL,
    segment_id   INTEGER NOT NULL REFERENCES segments(segment_id) ON DELETE CASCADE,
    frame_offset INTEGER NOT NULL,
    frame_len    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_order ON entries(segment_id, frame_offset);
CREATE INDEX IF NOT EXISTS idx_entries_session ON entries(session_id, segment_id, frame_offset);
CREATE INDEX IF NOT EXISTS idx_entries_ts ON entries(ts);

CREATE TABLE IF NOT EXISTS daily_aggregates (
    day   TEXT NOT NULL,
    kind  TEXT NOT NULL,
    stage TEXT NOT NULL DEFAULT '',
    count INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (day, kind, stage)
);
";
