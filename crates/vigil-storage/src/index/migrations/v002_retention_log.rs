//! Audit trail of irreversible retention deletions.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS retention_log (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    base_name  TEXT NOT NULL,
    tier       TEXT NOT NULL,
    entries    INTEGER NOT NULL,
    bytes      INTEGER NOT NULL,
    deleted_at INTEGER NOT NULL
);
";
