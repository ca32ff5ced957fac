//! Core domain logic for the attendance tracker.
//! This crate is the single source of truth for attendance invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod stats;
pub mod store;
pub mod transfer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::attendance::{AttendanceRecord, RecordId};
pub use model::calendar::{day_name, day_short, format_date, parse_date, weekday_of};
pub use model::settings::{AppSettings, SettingsError, SettingsPatch};
pub use model::subject::{
    NewSubject, Subject, SubjectId, SubjectPatch, SubjectValidationError, DEFAULT_SUBJECT_COLOR,
};
pub use repo::kv_repo::{
    PersistError, PersistResult, PersistenceAdapter, SqliteKvRepository, StorageKey,
};
pub use repo::memory_repo::MemoryKvRepository;
pub use stats::aggregator::{
    below_requirement, overall_stats, per_subject_stats, rounded_percentage, AttendanceStanding,
    OverallStats, SubjectStats, ATTENDANCE_REQUIREMENT,
};
pub use store::attendance_store::{AttendanceStore, LectureCountChange};
pub use store::reconcile::{cascade_remove_records, reconcile_lecture_count};
pub use transfer::export::{export_file_name, ExportDocument};
pub use transfer::import::{import_document, ImportError, ImportRejection, ImportReport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
