//! Per-subject and overall attendance percentages.
//!
//! # Responsibility
//! - Count recorded lecture slots and present slots per subject.
//! - Round percentages to one decimal with a single explicit policy.
//! - Classify subjects against the attendance requirement.
//!
//! # Invariants
//! - A subject without records reports exactly `0.0`, never NaN.
//! - Output order follows the subject collection order.
//! - Rounding is half-up on the tenth, computed in integer arithmetic.

use crate::model::attendance::AttendanceRecord;
use crate::model::subject::{Subject, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Minimum percentage considered compliant.
pub const ATTENDANCE_REQUIREMENT: f64 = 75.0;
/// Minimum percentage before a subject is flagged as low.
pub const WARNING_THRESHOLD: f64 = 60.0;

/// Statistics for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub total_classes: u32,
    pub present_classes: u32,
    pub attendance_percentage: f64,
    pub schedule: BTreeSet<u8>,
    pub color: String,
}

/// Totals across all subjects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_classes: u32,
    pub total_present: u32,
    pub overall_percentage: f64,
}

/// Coarse attendance health band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStanding {
    /// At or above [`ATTENDANCE_REQUIREMENT`].
    Good,
    /// At or above [`WARNING_THRESHOLD`] but under the requirement.
    Warning,
    Low,
}

impl AttendanceStanding {
    pub fn classify(percentage: f64) -> Self {
        if percentage >= ATTENDANCE_REQUIREMENT {
            Self::Good
        } else if percentage >= WARNING_THRESHOLD {
            Self::Warning
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Low => "low",
        }
    }
}

impl SubjectStats {
    pub fn standing(&self) -> AttendanceStanding {
        AttendanceStanding::classify(self.attendance_percentage)
    }
}

/// Percentage of `present` over `total`, rounded half-up to one decimal.
///
/// Returns `0.0` when `total == 0`.
pub fn rounded_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let present = u64::from(present);
    let total = u64::from(total);
    // tenths of a percent: floor(present * 1000 / total + 1/2)
    let tenths = (2 * present * 1000 + total) / (2 * total);
    tenths as f64 / 10.0
}

/// Computes statistics for every subject, in collection order.
pub fn per_subject_stats(subjects: &[Subject], records: &[AttendanceRecord]) -> Vec<SubjectStats> {
    let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in records {
        let entry = counts.entry(record.subject_id.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if record.present {
            entry.1 += 1;
        }
    }

    subjects
        .iter()
        .map(|subject| {
            let (total_classes, present_classes) =
                counts.get(subject.id.as_str()).copied().unwrap_or((0, 0));
            SubjectStats {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                total_classes,
                present_classes,
                attendance_percentage: rounded_percentage(present_classes, total_classes),
                schedule: subject.schedule.clone(),
                color: subject.color.clone(),
            }
        })
        .collect()
}

/// Sums per-subject statistics into overall totals.
pub fn overall_from(stats: &[SubjectStats]) -> OverallStats {
    let total_classes = stats.iter().map(|entry| entry.total_classes).sum();
    let total_present = stats.iter().map(|entry| entry.present_classes).sum();
    OverallStats {
        total_classes,
        total_present,
        overall_percentage: rounded_percentage(total_present, total_classes),
    }
}

/// Computes overall statistics across all subjects.
pub fn overall_stats(subjects: &[Subject], records: &[AttendanceRecord]) -> OverallStats {
    overall_from(&per_subject_stats(subjects, records))
}

/// Subjects strictly below `requirement` percent, in input order.
///
/// Subjects without any recorded lecture are not reported.
pub fn below_requirement(stats: &[SubjectStats], requirement: f64) -> Vec<&SubjectStats> {
    stats
        .iter()
        .filter(|entry| entry.total_classes > 0 && entry.attendance_percentage < requirement)
        .collect()
}
