//! Rebuilds subjects and attendance counts from an exported document.
//!
//! # Responsibility
//! - Parse an export-shaped JSON document leniently, entry by entry.
//! - Synthesize missing subjects and reconstruct their recorded counts.
//!
//! # Invariants
//! - A document that is not JSON or lacks a `subjects` array changes nothing.
//! - A rejected entry changes nothing; other entries still apply.
//! - Reconstructed records are stamped with the current day. Original
//!   per-lecture dates are not part of the document and cannot be restored.
//! - An entry above `MAX_IMPORTED_CLASSES` classes is rejected.

use crate::clock::Clock;
use crate::model::subject::{NewSubject, SubjectId, DEFAULT_SUBJECT_COLOR, MIN_LECTURES_PER_DAY};
use crate::repo::kv_repo::PersistenceAdapter;
use crate::store::attendance_store::AttendanceStore;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schedule assumed when an entry does not carry one (Monday to Friday).
pub const DEFAULT_IMPORT_SCHEDULE: [u8; 5] = [1, 2, 3, 4, 5];
/// Highest `totalClasses` accepted for one entry. Every class becomes a
/// record on the import day, so larger counts are rejected.
pub const MAX_IMPORTED_CLASSES: u32 = 1000;

/// Whole-document import failure, presentable to the user.
#[derive(Debug)]
pub enum ImportError {
    InvalidJson(serde_json::Error),
    MissingSubjects,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "import file is not valid JSON: {err}"),
            Self::MissingSubjects => {
                write!(f, "import file has no `subjects` list; is it an attendance export?")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            Self::MissingSubjects => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// One entry that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection {
    /// Position in the document's `subjects` array.
    pub index: usize,
    pub reason: String,
}

/// Summary of an applied import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created_subjects: Vec<SubjectId>,
    /// Names that already existed; their entries were left alone.
    pub skipped_existing: Vec<String>,
    pub rejected: Vec<ImportRejection>,
    pub records_created: usize,
}

impl ImportReport {
    /// Short user-facing summary line.
    pub fn summary(&self) -> String {
        format!(
            "Imported {} subject(s), {} record(s); skipped {} existing, rejected {}.",
            self.created_subjects.len(),
            self.records_created,
            self.skipped_existing.len(),
            self.rejected.len()
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedSubject {
    subject_name: String,
    total_classes: u32,
    present_classes: u32,
    #[serde(default)]
    schedule: Option<BTreeSet<u8>>,
    #[serde(default)]
    color: Option<String>,
}

impl ImportedSubject {
    fn into_new_subject(self) -> (NewSubject, u32, u32) {
        let schedule = self
            .schedule
            .unwrap_or_else(|| DEFAULT_IMPORT_SCHEDULE.into_iter().collect());
        let color = self
            .color
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT_COLOR.to_string());
        let absent = self.total_classes - self.present_classes;
        let new_subject = NewSubject {
            name: self.subject_name,
            schedule,
            lectures_per_day: MIN_LECTURES_PER_DAY,
            color: Some(color),
        };
        (new_subject, self.present_classes, absent)
    }
}

/// Parses `text` and applies it to `store`.
///
/// # Errors
/// - `ImportError` when the document itself is unusable; the store is
///   untouched in that case.
pub fn import_document<P: PersistenceAdapter, C: Clock>(
    store: &mut AttendanceStore<P, C>,
    text: &str,
) -> Result<ImportReport, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    let entries = document
        .get("subjects")
        .and_then(Value::as_array)
        .ok_or(ImportError::MissingSubjects)?;

    let today = store.today();
    let mut report = ImportReport::default();

    for (index, entry) in entries.iter().enumerate() {
        let imported = match ImportedSubject::deserialize(entry) {
            Ok(imported) => imported,
            Err(err) => {
                report.rejected.push(ImportRejection {
                    index,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if imported.present_classes > imported.total_classes {
            report.rejected.push(ImportRejection {
                index,
                reason: format!(
                    "presentClasses {} exceeds totalClasses {}",
                    imported.present_classes, imported.total_classes
                ),
            });
            continue;
        }

        if imported.total_classes > MAX_IMPORTED_CLASSES {
            report.rejected.push(ImportRejection {
                index,
                reason: format!(
                    "totalClasses {} exceeds the import limit of {MAX_IMPORTED_CLASSES}",
                    imported.total_classes
                ),
            });
            continue;
        }

        if store.subject_by_name(&imported.subject_name).is_some() {
            report
                .skipped_existing
                .push(imported.subject_name.trim().to_string());
            continue;
        }

        let (new_subject, present, absent) = imported.into_new_subject();
        let subject_id = match store.add_subject(new_subject) {
            Ok(subject_id) => subject_id,
            Err(err) => {
                report.rejected.push(ImportRejection {
                    index,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        report.records_created += store.append_history(&subject_id, today, present, absent);
        report.created_subjects.push(subject_id);
    }

    if !report.rejected.is_empty() {
        warn!(
            "event=import module=transfer status=partial rejected={}",
            report.rejected.len()
        );
    }
    info!(
        "event=import module=transfer status=ok created={} skipped={} records={}",
        report.created_subjects.len(),
        report.skipped_existing.len(),
        report.records_created
    );

    Ok(report)
}
