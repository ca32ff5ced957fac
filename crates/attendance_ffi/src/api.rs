//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose subject, attendance, statistics, transfer and settings use-cases
//!   to Dart via FRB.
//! - Translate typed core results into flat, string-keyed envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - DB-backed calls are serialized; each one loads, mutates and saves the
//!   store under one lock.

use attendance_core::db::open_db;
use attendance_core::stats::aggregator::overall_from;
use attendance_core::{
    below_requirement, core_version as core_version_inner, export_file_name, import_document,
    init_logging as init_logging_inner, parse_date, ping as ping_inner, AttendanceStore,
    ExportDocument, NewSubject, SettingsPatch, SqliteKvRepository, Subject, SubjectPatch,
    SubjectStats, ATTENDANCE_REQUIREMENT,
};
use chrono::NaiveDate;
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const ENTRY_DB_FILE_NAME: &str = "attendance_entry.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static ENTRY_LOCK: Mutex<()> = Mutex::new(());

type EntryStore<'conn> = AttendanceStore<SqliteKvRepository<'conn>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Subject row for list and setup screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectItem {
    pub subject_id: String,
    pub name: String,
    /// Weekdays ascending, `0 = Sunday`.
    pub schedule: Vec<u8>,
    pub lectures_per_day: u32,
    pub color: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// One scheduled subject on the daily screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySubjectItem {
    pub subject: SubjectItem,
    /// Default count raised to the highest recorded lecture of the day.
    pub lectures_for_day: u32,
    pub present_count: u32,
}

/// Daily screen envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayScheduleResponse {
    pub ok: bool,
    /// Resolved `YYYY-MM-DD` day.
    pub date: String,
    pub items: Vec<DaySubjectItem>,
    pub message: String,
}

/// Per-subject statistics row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectStatsItem {
    pub subject_id: String,
    pub subject_name: String,
    pub total_classes: u32,
    pub present_classes: u32,
    pub attendance_percentage: f64,
    /// `good|warning|low`.
    pub standing: String,
    pub color: String,
}

/// Overall statistics envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallStatsResponse {
    pub ok: bool,
    pub total_classes: u32,
    pub total_present: u32,
    pub overall_percentage: f64,
    /// Number of subjects with records under the attendance requirement.
    pub below_requirement: u32,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Subject targeted or created by the action.
    pub subject_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, subject_id: Option<String>) -> Self {
        Self {
            ok: true,
            subject_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            subject_id: None,
            message: message.into(),
        }
    }
}

/// Result of changing one day's lecture count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureCountResponse {
    pub ok: bool,
    pub applied_count: u32,
    pub removed_lectures: Vec<u32>,
    pub message: String,
}

/// Export payload for the share/file collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub json: String,
    pub message: String,
}

/// Import outcome for user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    pub created_subjects: u32,
    pub skipped_existing: u32,
    pub rejected: u32,
    pub records_created: u32,
    pub message: String,
}

/// Persisted preferences plus the next due reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub ok: bool,
    pub notifications_enabled: bool,
    pub notification_time: String,
    pub first_time_setup: bool,
    /// Local `YYYY-MM-DDTHH:MM:SS` of the next reminder, when enabled.
    pub next_reminder_at: Option<String>,
    pub message: String,
}

/// Lists all subjects in creation order.
///
/// # FFI contract
/// - Never panics; returns an empty list when the DB cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_list() -> Vec<SubjectItem> {
    with_store(|store| {
        store
            .subjects()
            .iter()
            .map(to_subject_item)
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|err| {
        warn!("event=ffi_call module=ffi status=error call=subject_list error={err}");
        Vec::new()
    })
}

/// Creates a subject from the setup form.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_add(
    name: String,
    schedule: Vec<u8>,
    lectures_per_day: u32,
    color: Option<String>,
) -> ActionResponse {
    let input = NewSubject {
        name,
        schedule: schedule.into_iter().collect(),
        lectures_per_day,
        color,
    };
    match with_store(|store| store.add_subject(input)) {
        Ok(Ok(subject_id)) => {
            ActionResponse::success("Subject added.", Some(subject_id))
        }
        Ok(Err(err)) => ActionResponse::failure(format!("subject_add failed: {err}")),
        Err(err) => ActionResponse::failure(format!("subject_add failed: {err}")),
    }
}

/// Applies a partial subject edit; omitted fields stay unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_edit(
    subject_id: String,
    name: Option<String>,
    schedule: Option<Vec<u8>>,
    lectures_per_day: Option<u32>,
    color: Option<String>,
) -> ActionResponse {
    let id = match parse_subject_id(&subject_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("subject_edit failed: {err}")),
    };
    let patch = SubjectPatch {
        name,
        schedule: schedule.map(|days| days.into_iter().collect()),
        lectures_per_day,
        color,
    };
    match with_store(|store| store.edit_subject(&id, &patch)) {
        Ok(Ok(true)) => ActionResponse::success("Subject updated.", Some(subject_id)),
        Ok(Ok(false)) => ActionResponse::success("Subject not found; nothing changed.", None),
        Ok(Err(err)) => ActionResponse::failure(format!("subject_edit failed: {err}")),
        Err(err) => ActionResponse::failure(format!("subject_edit failed: {err}")),
    }
}

/// Removes a subject together with its attendance history.
#[flutter_rust_bridge::frb(sync)]
pub fn subject_remove(subject_id: String) -> ActionResponse {
    let id = match parse_subject_id(&subject_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("subject_remove failed: {err}")),
    };
    match with_store(|store| store.remove_subject(&id)) {
        Ok(true) => ActionResponse::success("Subject removed.", Some(subject_id)),
        Ok(false) => ActionResponse::success("Subject not found; nothing changed.", None),
        Err(err) => ActionResponse::failure(format!("subject_remove failed: {err}")),
    }
}

/// Subjects scheduled on `date` (default today) with per-day lecture state.
#[flutter_rust_bridge::frb(sync)]
pub fn day_schedule(date: Option<String>) -> DayScheduleResponse {
    let failure = |message: String| DayScheduleResponse {
        ok: false,
        date: String::new(),
        items: Vec::new(),
        message,
    };
    let date = match parse_optional_date(date) {
        Ok(date) => date,
        Err(err) => return failure(format!("day_schedule failed: {err}")),
    };

    let result = with_store(|store| {
        let day = date.unwrap_or_else(|| store.today());
        let items = store
            .subjects_scheduled_on_date(day)
            .into_iter()
            .map(|subject| {
                let lectures_for_day = store
                    .lectures_for_day(&subject.id, day)
                    .unwrap_or(subject.lectures_per_day);
                DaySubjectItem {
                    subject: to_subject_item(subject),
                    lectures_for_day,
                    present_count: store.present_count_for_day(&subject.id, day, lectures_for_day),
                }
            })
            .collect::<Vec<_>>();
        (day, items)
    });

    match result {
        Ok((day, items)) => {
            let message = if items.is_empty() {
                "No classes scheduled.".to_string()
            } else {
                format!("{} subject(s) scheduled.", items.len())
            };
            DayScheduleResponse {
                ok: true,
                date: attendance_core::format_date(day),
                items,
                message,
            }
        }
        Err(err) => failure(format!("day_schedule failed: {err}")),
    }
}

/// Marks one lecture slot present or absent (upsert).
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_mark(
    subject_id: String,
    lecture_number: u32,
    present: bool,
    date: Option<String>,
) -> ActionResponse {
    let parsed = parse_subject_id(&subject_id)
        .and_then(|id| parse_optional_date(date).map(|date| (id, date)));
    let (id, date) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return ActionResponse::failure(format!("attendance_mark failed: {err}")),
    };
    if lecture_number == 0 {
        return ActionResponse::failure("attendance_mark failed: lecture numbers start at 1");
    }
    match with_store(|store| store.mark_attendance(&id, lecture_number, present, date)) {
        Ok(()) => ActionResponse::success("Attendance saved.", Some(subject_id)),
        Err(err) => ActionResponse::failure(format!("attendance_mark failed: {err}")),
    }
}

/// Clears one lecture slot.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_remove(
    subject_id: String,
    lecture_number: u32,
    date: Option<String>,
) -> ActionResponse {
    let parsed = parse_subject_id(&subject_id)
        .and_then(|id| parse_optional_date(date).map(|date| (id, date)));
    let (id, date) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return ActionResponse::failure(format!("attendance_remove failed: {err}")),
    };
    match with_store(|store| store.remove_attendance(&id, lecture_number, date)) {
        Ok(true) => ActionResponse::success("Attendance cleared.", Some(subject_id)),
        Ok(false) => ActionResponse::success("No attendance recorded; nothing changed.", None),
        Err(err) => ActionResponse::failure(format!("attendance_remove failed: {err}")),
    }
}

/// Present/absent value for one slot; `None` when unrecorded or on bad input.
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_value(subject_id: String, date: String, lecture_number: u32) -> Option<bool> {
    let id = parse_subject_id(&subject_id).ok()?;
    let day = parse_date(&date)?;
    with_store(|store| store.attendance_value(&id, day, lecture_number))
        .ok()
        .flatten()
}

/// Changes how many lectures a subject has on one day (0 cancels the day).
#[flutter_rust_bridge::frb(sync)]
pub fn attendance_set_lecture_count(
    subject_id: String,
    date: Option<String>,
    count: i32,
) -> LectureCountResponse {
    let failure = |message: String| LectureCountResponse {
        ok: false,
        applied_count: 0,
        removed_lectures: Vec::new(),
        message,
    };
    let parsed = parse_subject_id(&subject_id)
        .and_then(|id| parse_optional_date(date).map(|date| (id, date)));
    let (id, date) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return failure(format!("attendance_set_lecture_count failed: {err}")),
    };
    match with_store(|store| store.set_lecture_count(&id, date, i64::from(count))) {
        Ok(change) => {
            let message = if change.is_cancelled() {
                "Lectures cancelled for the day.".to_string()
            } else {
                format!("{} lecture(s) for the day.", change.applied_count)
            };
            LectureCountResponse {
                ok: true,
                applied_count: change.applied_count,
                removed_lectures: change.removed_lectures,
                message,
            }
        }
        Err(err) => failure(format!("attendance_set_lecture_count failed: {err}")),
    }
}

/// Per-subject statistics in subject order.
#[flutter_rust_bridge::frb(sync)]
pub fn stats_subjects() -> Vec<SubjectStatsItem> {
    with_store(|store| {
        store
            .per_subject_stats()
            .into_iter()
            .map(to_stats_item)
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|err| {
        warn!("event=ffi_call module=ffi status=error call=stats_subjects error={err}");
        Vec::new()
    })
}

/// Overall statistics plus the count of subjects under the requirement.
#[flutter_rust_bridge::frb(sync)]
pub fn stats_overall() -> OverallStatsResponse {
    let result = with_store(|store| {
        let stats = store.per_subject_stats();
        let below = below_requirement(&stats, ATTENDANCE_REQUIREMENT).len();
        (overall_from(&stats), below)
    });
    match result {
        Ok((overall, below)) => OverallStatsResponse {
            ok: true,
            total_classes: overall.total_classes,
            total_present: overall.total_present,
            overall_percentage: overall.overall_percentage,
            below_requirement: u32::try_from(below).unwrap_or(u32::MAX),
            message: String::new(),
        },
        Err(err) => OverallStatsResponse {
            ok: false,
            total_classes: 0,
            total_present: 0,
            overall_percentage: 0.0,
            below_requirement: 0,
            message: format!("stats_overall failed: {err}"),
        },
    }
}

/// Builds the export document and its suggested file name.
#[flutter_rust_bridge::frb(sync)]
pub fn data_export() -> ExportResponse {
    let result = with_store(|store| {
        let document = ExportDocument::from_store(store);
        let file_name = export_file_name(store.today());
        document
            .to_json_pretty()
            .map(|json| (file_name, json))
            .map_err(|err| err.to_string())
    })
    .and_then(|inner| inner);

    match result {
        Ok((file_name, json)) => ExportResponse {
            ok: true,
            file_name,
            json,
            message: "Export ready.".to_string(),
        },
        Err(err) => ExportResponse {
            ok: false,
            file_name: String::new(),
            json: String::new(),
            message: format!("data_export failed: {err}"),
        },
    }
}

/// Imports an export document chosen by the user.
#[flutter_rust_bridge::frb(sync)]
pub fn data_import(json: String) -> ImportResponse {
    let failure = |message: String| ImportResponse {
        ok: false,
        created_subjects: 0,
        skipped_existing: 0,
        rejected: 0,
        records_created: 0,
        message,
    };
    match with_store(|store| import_document(store, &json)) {
        Ok(Ok(report)) => ImportResponse {
            ok: true,
            created_subjects: count_u32(report.created_subjects.len()),
            skipped_existing: count_u32(report.skipped_existing.len()),
            rejected: count_u32(report.rejected.len()),
            records_created: count_u32(report.records_created),
            message: report.summary(),
        },
        Ok(Err(err)) => failure(format!("Import failed: {err}")),
        Err(err) => failure(format!("data_import failed: {err}")),
    }
}

/// Reads persisted preferences.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_get() -> SettingsResponse {
    settings_call(SettingsPatch::default(), "settings_get")
}

/// Updates preferences; `None` fields keep their value.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_update(
    notifications_enabled: Option<bool>,
    notification_time: Option<String>,
    first_time_setup: Option<bool>,
) -> SettingsResponse {
    let patch = SettingsPatch {
        notifications_enabled,
        notification_time,
        first_time_setup,
    };
    settings_call(patch, "settings_update")
}

fn settings_call(patch: SettingsPatch, call: &str) -> SettingsResponse {
    let is_read = patch == SettingsPatch::default();
    let result = with_store(|store| {
        let settings = if is_read {
            store.settings().clone()
        } else {
            store.update_settings(&patch)?.clone()
        };
        let now = chrono::Local::now().naive_local();
        let next = settings
            .next_reminder_after(now)
            .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string());
        Ok::<_, attendance_core::SettingsError>((settings, next))
    });

    match result {
        Ok(Ok((settings, next_reminder_at))) => SettingsResponse {
            ok: true,
            notifications_enabled: settings.notifications_enabled,
            notification_time: settings.notification_time,
            first_time_setup: settings.first_time_setup,
            next_reminder_at,
            message: String::new(),
        },
        Ok(Err(err)) => settings_failure(format!("{call} failed: {err}")),
        Err(err) => settings_failure(format!("{call} failed: {err}")),
    }
}

fn settings_failure(message: String) -> SettingsResponse {
    let defaults = attendance_core::AppSettings::default();
    SettingsResponse {
        ok: false,
        notifications_enabled: defaults.notifications_enabled,
        notification_time: defaults.notification_time,
        first_time_setup: defaults.first_time_setup,
        next_reminder_at: None,
        message,
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH.get_or_init(default_entry_db_path).clone()
}

#[cfg(not(test))]
fn default_entry_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("ATTENDANCE_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
}

// unit tests never touch the host's entry DB
#[cfg(test)]
fn default_entry_db_path() -> PathBuf {
    static TEST_DB_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
    TEST_DB_DIR
        .get_or_init(|| tempfile::tempdir().expect("create test DB dir"))
        .path()
        .join(ENTRY_DB_FILE_NAME)
}

fn with_store<T>(f: impl FnOnce(&mut EntryStore<'_>) -> T) -> Result<T, String> {
    let _guard = ENTRY_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| format!("entry DB open failed: {err}"))?;
    let mut store = AttendanceStore::open(SqliteKvRepository::new(&conn));
    Ok(f(&mut store))
}

fn parse_subject_id(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("invalid subject id: empty".to_string());
    }
    Ok(trimmed.to_string())
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text)
            .map(Some)
            .ok_or_else(|| format!("invalid date `{text}`; expected YYYY-MM-DD")),
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_subject_item(subject: &Subject) -> SubjectItem {
    SubjectItem {
        subject_id: subject.id.clone(),
        name: subject.name.clone(),
        schedule: subject.schedule.iter().copied().collect(),
        lectures_per_day: subject.lectures_per_day,
        color: subject.color.clone(),
        created_at: subject.created_at.to_rfc3339(),
    }
}

fn to_stats_item(stats: SubjectStats) -> SubjectStatsItem {
    SubjectStatsItem {
        standing: stats.standing().label().to_string(),
        subject_id: stats.subject_id,
        subject_name: stats.subject_name,
        total_classes: stats.total_classes,
        present_classes: stats.present_classes,
        attendance_percentage: stats.attendance_percentage,
        color: stats.color,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        attendance_mark, attendance_set_lecture_count, attendance_value, core_version,
        data_export, data_import, day_schedule, init_logging, ping, resolve_entry_db_path,
        stats_overall, stats_subjects, subject_add, subject_edit, subject_list, subject_remove,
        ENTRY_DB_FILE_NAME,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn subject_add_rejects_invalid_input() {
        let response = subject_add(unique_token("bad"), vec![9], 1, None);
        assert!(!response.ok);
        assert!(response.message.contains("weekday"));
    }

    #[test]
    fn marking_and_stats_flow_through_the_entry_db() {
        let name = unique_token("math");
        let created = subject_add(name.clone(), vec![1, 3, 5], 2, Some("#3B82F6".to_string()));
        assert!(created.ok, "{}", created.message);
        let subject_id = created.subject_id.expect("subject_add should return id");

        let marked = attendance_mark(subject_id.clone(), 1, true, Some("2024-01-01".to_string()));
        assert!(marked.ok, "{}", marked.message);
        attendance_mark(subject_id.clone(), 2, false, Some("2024-01-01".to_string()));
        assert_eq!(
            attendance_value(subject_id.clone(), "2024-01-01".to_string(), 2),
            Some(false)
        );

        let stats = stats_subjects();
        let entry = stats
            .iter()
            .find(|item| item.subject_id == subject_id)
            .expect("stats should include subject");
        assert_eq!(entry.total_classes, 2);
        assert_eq!(entry.present_classes, 1);
        assert_eq!(entry.attendance_percentage, 50.0);
        assert_eq!(entry.standing, "low");

        let day = day_schedule(Some("2024-01-01".to_string()));
        assert!(day.ok);
        let item = day
            .items
            .iter()
            .find(|item| item.subject.subject_id == subject_id)
            .expect("Monday schedule should include subject");
        assert_eq!(item.lectures_for_day, 2);
        assert_eq!(item.present_count, 1);

        let change =
            attendance_set_lecture_count(subject_id.clone(), Some("2024-01-01".to_string()), 0);
        assert!(change.ok);
        assert_eq!(change.removed_lectures, vec![1, 2]);
        assert_eq!(
            attendance_value(subject_id.clone(), "2024-01-01".to_string(), 1),
            None
        );

        let overall = stats_overall();
        assert!(overall.ok, "{}", overall.message);

        let removed = subject_remove(subject_id.clone());
        assert!(removed.ok);
        assert!(subject_list()
            .iter()
            .all(|subject| subject.subject_id != subject_id));
    }

    #[test]
    fn subject_edit_reports_bad_ids() {
        let response = subject_edit("   ".to_string(), None, None, Some(2), None);
        assert!(!response.ok);
        assert!(response.message.contains("invalid subject id"));

        let missing = subject_edit(unique_token("missing"), None, None, Some(2), None);
        assert!(missing.ok);
        assert!(missing.subject_id.is_none());
    }

    #[test]
    fn tests_use_a_private_entry_db() {
        let path = resolve_entry_db_path();
        assert_ne!(path, std::env::temp_dir().join(ENTRY_DB_FILE_NAME));
        assert!(path.ends_with(ENTRY_DB_FILE_NAME));
    }

    #[test]
    fn attendance_mark_rejects_bad_date() {
        let created = subject_add(unique_token("date"), vec![2], 1, None);
        let subject_id = created.subject_id.expect("subject id");
        let response = attendance_mark(subject_id.clone(), 1, true, Some("01/02/2024".to_string()));
        assert!(!response.ok);
        subject_remove(subject_id);
    }

    #[test]
    fn export_then_import_skips_existing_names() {
        let name = unique_token("export");
        let created = subject_add(name, vec![4], 1, None);
        assert!(created.ok, "{}", created.message);

        let exported = data_export();
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.file_name.starts_with("attendance-data-"));

        let imported = data_import(exported.json);
        assert!(imported.ok, "{}", imported.message);
        assert!(imported.skipped_existing >= 1);

        let broken = data_import("{".to_string());
        assert!(!broken.ok);
        assert!(broken.message.starts_with("Import failed"));

        subject_remove(created.subject_id.expect("subject id"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
