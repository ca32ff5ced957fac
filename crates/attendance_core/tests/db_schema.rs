use attendance_core::db::{open_db, open_db_in_memory, schema_version, DbError, SCHEMA_VERSION};
use attendance_core::{PersistenceAdapter, SqliteKvRepository, StorageKey};
use rusqlite::Connection;
use serde_json::json;

#[test]
fn fresh_database_gets_stamped_kv_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn saved_entries_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    {
        let conn = open_db(&path).unwrap();
        SqliteKvRepository::new(&conn)
            .save(StorageKey::Subjects, &json!([{"id": "V1StGXR8_Z5jdHi6B-myT"}]))
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = SqliteKvRepository::new(&conn)
        .load(StorageKey::Subjects)
        .unwrap();
    assert_eq!(loaded, Some(json!([{"id": "V1StGXR8_Z5jdHi6B-myT"}])));
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
}

#[test]
fn unstamped_file_with_existing_rows_is_adopted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unstamped.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE kv_entries (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO kv_entries (key, value)
        VALUES ('attendance_tracker_settings', '{\"notificationsEnabled\":true,\"notificationTime\":\"08:30\",\"firstTimeSetup\":false}');",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    let settings = SqliteKvRepository::new(&conn)
        .load(StorageKey::Settings)
        .unwrap()
        .unwrap();
    assert_eq!(settings["notificationTime"], "08:30");
}

#[test]
fn newer_schema_is_rejected_without_touching_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 7;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 7);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);
}
