//! Attendance record domain model.
//!
//! # Invariants
//! - `(subject_id, date, lecture_number)` identifies one lecture slot; the
//!   store keeps at most one record per slot.
//! - `subject_id` is a non-owning back-reference; the store removes records
//!   when their subject goes away.

use crate::model::subject::SubjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable opaque identifier of an attendance record.
pub type RecordId = String;

/// Present/absent outcome for one lecture slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub subject_id: SubjectId,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// 1-based lecture index within `date`.
    #[serde(default = "first_lecture")]
    pub lecture_number: u32,
    pub present: bool,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Creates a record for one slot with a generated id.
    pub fn new(
        subject_id: &str,
        date: NaiveDate,
        lecture_number: u32,
        present: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            date,
            lecture_number,
            present,
            created_at,
        }
    }

    /// Returns whether this record occupies the given slot.
    pub fn is_slot(&self, subject_id: &str, date: NaiveDate, lecture_number: u32) -> bool {
        self.subject_id == subject_id && self.date == date && self.lecture_number == lecture_number
    }

    /// Returns whether this record belongs to `subject_id` on `date`.
    pub fn is_on(&self, subject_id: &str, date: NaiveDate) -> bool {
        self.subject_id == subject_id && self.date == date
    }
}

fn first_lecture() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::AttendanceRecord;
    use chrono::NaiveDate;

    #[test]
    fn date_serializes_as_calendar_day() {
        let record = AttendanceRecord::new(
            "subject-1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            2,
            true,
            chrono::Utc::now(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["lectureNumber"], 2);
        assert!(value.get("subjectId").is_some());

        let back: AttendanceRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_without_lecture_number_defaults_to_first() {
        let json = serde_json::json!({
            "id": "Uakgb_J5m9g-0JDMbcJqL",
            "subjectId": "V1StGXR8_Z5jdHi6B-myT",
            "date": "2024-03-05",
            "present": false,
            "createdAt": "2024-03-05T10:00:00.000Z"
        });
        let record: AttendanceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.lecture_number, 1);
        assert_eq!(record.subject_id, "V1StGXR8_Z5jdHi6B-myT");
        assert!(!record.present);
    }
}
