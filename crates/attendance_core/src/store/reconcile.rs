//! Explicit invariant routines used by the store.
//!
//! Both functions are pure over the record collection so they can be tested
//! without a store or an adapter.

use crate::model::attendance::AttendanceRecord;
use crate::model::subject::MAX_LECTURES_PER_DAY;

/// Removes every record owned by `subject_id`. Returns how many were removed.
pub fn cascade_remove_records(records: &mut Vec<AttendanceRecord>, subject_id: &str) -> usize {
    let before = records.len();
    records.retain(|record| record.subject_id != subject_id);
    before - records.len()
}

/// Clamps a per-day lecture count to `0..=10`.
pub fn clamp_lecture_count(count: i64) -> u32 {
    // clamp keeps the value inside u32 range
    count.clamp(0, i64::from(MAX_LECTURES_PER_DAY)) as u32
}

/// Lecture numbers to remove when one day's lecture count drops to `new_count`.
///
/// `day_records` are the records of a single subject+date. Every recorded
/// lecture number strictly greater than `new_count` is returned in ascending
/// order; `new_count == 0` (cancelled day) returns all of them. Raising the
/// count returns nothing.
pub fn reconcile_lecture_count<'a>(
    day_records: impl IntoIterator<Item = &'a AttendanceRecord>,
    new_count: u32,
) -> Vec<u32> {
    let mut stale = day_records
        .into_iter()
        .map(|record| record.lecture_number)
        .filter(|lecture_number| *lecture_number > new_count)
        .collect::<Vec<_>>();
    stale.sort_unstable();
    stale.dedup();
    stale
}

#[cfg(test)]
mod tests {
    use super::{cascade_remove_records, clamp_lecture_count, reconcile_lecture_count};
    use crate::model::attendance::AttendanceRecord;
    use chrono::{NaiveDate, Utc};

    fn day_records(subject_id: &str, lectures: &[u32]) -> Vec<AttendanceRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        lectures
            .iter()
            .map(|lecture| AttendanceRecord::new(subject_id, date, *lecture, true, Utc::now()))
            .collect()
    }

    #[test]
    fn reducing_count_returns_higher_lectures_only() {
        let records = day_records("math", &[3, 1, 2]);
        assert_eq!(reconcile_lecture_count(&records, 1), vec![2, 3]);
        assert_eq!(reconcile_lecture_count(&records, 0), vec![1, 2, 3]);
        assert!(reconcile_lecture_count(&records, 3).is_empty());
        assert!(reconcile_lecture_count(&records, 8).is_empty());
    }

    #[test]
    fn gaps_in_recorded_lectures_are_skipped() {
        let records = day_records("math", &[1, 4]);
        assert_eq!(reconcile_lecture_count(&records, 2), vec![4]);
    }

    #[test]
    fn clamp_bounds_count() {
        assert_eq!(clamp_lecture_count(-3), 0);
        assert_eq!(clamp_lecture_count(4), 4);
        assert_eq!(clamp_lecture_count(42), 10);
    }

    #[test]
    fn cascade_removes_only_owned_records() {
        let owner = "V1StGXR8_Z5jdHi6B-myT";
        let other = "art";
        let mut records = day_records(owner, &[1, 2]);
        records.extend(day_records(other, &[1]));

        assert_eq!(cascade_remove_records(&mut records, owner), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject_id, other);
        assert_eq!(cascade_remove_records(&mut records, owner), 0);
    }
}
