//! Schema migrations using PRAGMA user_version.

pub mod v001_initial;
pub mod v002_retention_log;

use rusqlite::Connection;
use vigil_core::errors::StorageError;

pub const LATEST_VERSION: u32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;

    let migrations: &[(&str, u32)] = &[
        (v001_initial::MIGRATION_SQL, 1),
        (v002_retention_log::MIGRATION_SQL, 2),
    ];

    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    reason: e.to_string(),
                })?;
            tracing::info!(event = "migration_applied", version = version, "applied index migration");
        }
    }
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            reason: e.to_string(),
        })
}
