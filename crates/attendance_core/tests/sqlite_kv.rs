use attendance_core::db::{open_db, open_db_in_memory};
use attendance_core::{
    AttendanceStore, Clock, FixedClock, NewSubject, PersistError, PersistenceAdapter,
    SqliteKvRepository, StorageKey,
};
use chrono::NaiveDate;
use serde_json::json;

#[test]
fn save_overwrites_and_load_returns_latest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);

    assert!(repo.load(StorageKey::Subjects).unwrap().is_none());
    repo.save(StorageKey::Subjects, &json!([1])).unwrap();
    repo.save(StorageKey::Subjects, &json!([1, 2])).unwrap();
    assert_eq!(repo.load(StorageKey::Subjects).unwrap(), Some(json!([1, 2])));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn corrupt_row_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2);",
        [StorageKey::Settings.as_str(), "{oops"],
    )
    .unwrap();

    let repo = SqliteKvRepository::new(&conn);
    let err = repo.load(StorageKey::Settings).unwrap_err();
    assert!(matches!(
        err,
        PersistError::InvalidData {
            key: StorageKey::Settings,
            ..
        }
    ));
}

#[test]
fn store_state_survives_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");
    let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

    let math = {
        let conn = open_db(&path).unwrap();
        let mut store =
            AttendanceStore::open_with_clock(SqliteKvRepository::new(&conn), FixedClock::on(date));
        let math = store.add_subject(NewSubject::new("Math", [2], 2)).unwrap();
        store.mark_attendance(&math, 1, true, None);
        store.mark_attendance(&math, 2, true, None);
        store.set_lecture_count(&math, None, 1);
        math
    };

    let conn = open_db(&path).unwrap();
    let store =
        AttendanceStore::open_with_clock(SqliteKvRepository::new(&conn), FixedClock::on(date));
    assert_eq!(store.subjects().len(), 1);
    assert_eq!(store.records_for(&math, date).len(), 1);
    assert_eq!(store.attendance_value(&math, date, 1), Some(true));
    assert_eq!(
        store.subject(&math).unwrap().created_at,
        FixedClock::on(date).now()
    );
}
