//! Statistics export document.

use crate::clock::Clock;
use crate::model::calendar::format_date;
use crate::repo::kv_repo::PersistenceAdapter;
use crate::stats::aggregator::{overall_from, OverallStats, SubjectStats};
use crate::store::attendance_store::AttendanceStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Exported snapshot of attendance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub overall_stats: OverallStats,
    pub subjects: Vec<SubjectStats>,
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    /// Builds a document from the store's current statistics.
    pub fn from_store<P: PersistenceAdapter, C: Clock>(store: &AttendanceStore<P, C>) -> Self {
        Self::from_stats(store.per_subject_stats(), store.clock().now())
    }

    pub fn from_stats(subjects: Vec<SubjectStats>, export_date: DateTime<Utc>) -> Self {
        Self {
            overall_stats: overall_from(&subjects),
            subjects,
            export_date,
        }
    }

    /// Pretty-printed JSON text.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Suggested file name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("attendance-data-{}.json", format_date(date))
}
