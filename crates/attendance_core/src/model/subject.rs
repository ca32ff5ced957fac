//! Subject domain model.
//!
//! # Responsibility
//! - Define a tracked course with its weekly recurrence pattern.
//! - Validate creator input and partial edits before they reach the store.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `schedule` only contains weekdays `0..=6` (0 = Sunday).
//! - `lectures_per_day` stays within `1..=10`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable opaque identifier of a subject.
///
/// New subjects get UUID v4 text; ids written by earlier app versions (for
/// example nanoid strings) are kept as they are.
pub type SubjectId = String;

/// Display color assigned when the creator does not pick one.
pub const DEFAULT_SUBJECT_COLOR: &str = "#8B5CF6";
/// Lower bound of the default per-day lecture count.
pub const MIN_LECTURES_PER_DAY: u32 = 1;
/// Upper bound of any per-day lecture count.
pub const MAX_LECTURES_PER_DAY: u32 = 10;
/// Highest valid weekday index (Saturday).
pub const MAX_WEEKDAY: u8 = 6;

/// A tracked course/class with a weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Weekdays with lectures, `0 = Sunday`.
    pub schedule: BTreeSet<u8>,
    /// Default lecture count for a scheduled day. Actual days may diverge.
    #[serde(default = "default_lectures_per_day")]
    pub lectures_per_day: u32,
    /// Opaque display tag.
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Creator input for a new subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    pub name: String,
    pub schedule: BTreeSet<u8>,
    pub lectures_per_day: u32,
    /// `None` falls back to [`DEFAULT_SUBJECT_COLOR`].
    pub color: Option<String>,
}

impl NewSubject {
    /// Convenience constructor with default color.
    pub fn new(
        name: impl Into<String>,
        schedule: impl IntoIterator<Item = u8>,
        lectures_per_day: u32,
    ) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into_iter().collect(),
            lectures_per_day,
            color: None,
        }
    }

    /// Sets an explicit display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update for an existing subject. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub schedule: Option<BTreeSet<u8>>,
    pub lectures_per_day: Option<u32>,
    pub color: Option<String>,
}

impl SubjectPatch {
    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.schedule.is_none()
            && self.lectures_per_day.is_none()
            && self.color.is_none()
    }
}

/// Validation failures for subject input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectValidationError {
    EmptyName,
    EmptyColor,
    InvalidWeekday(u8),
    LecturesPerDayOutOfRange(u32),
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "subject name is required"),
            Self::EmptyColor => write!(f, "subject color cannot be empty"),
            Self::InvalidWeekday(day) => {
                write!(f, "invalid weekday `{day}`; expected 0 (Sunday) to 6")
            }
            Self::LecturesPerDayOutOfRange(count) => write!(
                f,
                "lectures per day `{count}` out of range {MIN_LECTURES_PER_DAY}..={MAX_LECTURES_PER_DAY}"
            ),
        }
    }
}

impl Error for SubjectValidationError {}

impl Subject {
    /// Builds a subject from creator input with a generated id.
    ///
    /// Name and color are trimmed; the result is validated before returning.
    pub fn create(
        input: NewSubject,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectValidationError> {
        let color = input
            .color
            .map(|value| value.trim().to_string())
            .unwrap_or_else(default_color);
        let subject = Self {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            schedule: input.schedule,
            lectures_per_day: input.lectures_per_day,
            color,
            created_at,
        };
        subject.validate()?;
        Ok(subject)
    }

    /// Validates field-level invariants.
    pub fn validate(&self) -> Result<(), SubjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(SubjectValidationError::EmptyName);
        }
        if self.color.trim().is_empty() {
            return Err(SubjectValidationError::EmptyColor);
        }
        if let Some(day) = self.schedule.iter().find(|day| **day > MAX_WEEKDAY) {
            return Err(SubjectValidationError::InvalidWeekday(*day));
        }
        if !(MIN_LECTURES_PER_DAY..=MAX_LECTURES_PER_DAY).contains(&self.lectures_per_day) {
            return Err(SubjectValidationError::LecturesPerDayOutOfRange(
                self.lectures_per_day,
            ));
        }
        Ok(())
    }

    /// Returns a copy with `patch` merged in, validated. `self` is untouched.
    pub fn merged(&self, patch: &SubjectPatch) -> Result<Self, SubjectValidationError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(schedule) = &patch.schedule {
            next.schedule = schedule.clone();
        }
        if let Some(lectures_per_day) = patch.lectures_per_day {
            next.lectures_per_day = lectures_per_day;
        }
        if let Some(color) = &patch.color {
            next.color = color.trim().to_string();
        }
        next.validate()?;
        Ok(next)
    }

    /// Returns whether this subject has lectures on `weekday`.
    pub fn is_scheduled_on(&self, weekday: u8) -> bool {
        self.schedule.contains(&weekday)
    }
}

fn default_lectures_per_day() -> u32 {
    MIN_LECTURES_PER_DAY
}

fn default_color() -> String {
    DEFAULT_SUBJECT_COLOR.to_string()
}
