//! Key-value persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `load`/`save` of JSON values under three logical keys.
//! - Map storage failures to `PersistError`.
//!
//! # Invariants
//! - `save` replaces the whole value stored under a key.
//! - `load` rejects corrupt stored text instead of masking it.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Logical storage keys shared by all adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Subjects,
    Attendance,
    Settings,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subjects => "attendance_tracker_subjects",
            Self::Attendance => "attendance_tracker_attendance",
            Self::Settings => "attendance_tracker_settings",
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one load or save attempt.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    Serde(serde_json::Error),
    InvalidData { key: StorageKey, message: String },
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "json error: {err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid persisted data under `{key}`: {message}")
            }
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidData { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Durable key-value storage used by the attendance store.
pub trait PersistenceAdapter {
    /// Returns the stored value, or `None` when the key was never saved.
    fn load(&self, key: StorageKey) -> PersistResult<Option<Value>>;
    fn save(&self, key: StorageKey, value: &Value) -> PersistResult<()>;
}

impl<T: PersistenceAdapter + ?Sized> PersistenceAdapter for &T {
    fn load(&self, key: StorageKey) -> PersistResult<Option<Value>> {
        (**self).load(key)
    }

    fn save(&self, key: StorageKey, value: &Value) -> PersistResult<()> {
        (**self).save(key, value)
    }
}

/// SQLite-backed adapter over the `kv_entries` table.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection whose schema is in place (see `db::open_db`).
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersistenceAdapter for SqliteKvRepository<'_> {
    fn load(&self, key: StorageKey) -> PersistResult<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => serde_json::from_str(&text).map(Some).map_err(|err| {
                PersistError::InvalidData {
                    key,
                    message: err.to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    fn save(&self, key: StorageKey, value: &Value) -> PersistResult<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.as_str(), text],
        )?;
        Ok(())
    }
}
