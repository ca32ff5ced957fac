//! `kv_entries` schema bootstrap.
//!
//! One table holds the JSON text of each storage key. Files created before
//! the schema was stamped (`user_version = 0`) are adopted as they are.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema stamp written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const KV_ENTRIES_DDL: &str = "
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Creates `kv_entries` when missing and stamps the schema version.
///
/// # Errors
/// - `DbError::SchemaTooNew` when the file carries a higher stamp; the file
///   is left untouched.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(KV_ENTRIES_DDL)?;
    if found < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        info!("event=db_schema module=db status=ok from_version={found} to_version={SCHEMA_VERSION}");
    }
    Ok(())
}

/// Reads the stamp from `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}
