//! App preference blob persisted beside the attendance collections.
//!
//! # Responsibility
//! - Hold reminder preferences and the first-run flag.
//! - Compute when the next daily reminder is due (delivery stays external).
//!
//! # Invariants
//! - `notification_time` is always a valid `HH:MM` 24-hour time once
//!   accepted by `validate`.

use chrono::{Days, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static NOTIFICATION_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid notification time regex")
});

/// Reminder time used before the user picks one.
pub const DEFAULT_NOTIFICATION_TIME: &str = "19:00";

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications_enabled: bool,
    /// Local wall-clock time in `HH:MM`.
    pub notification_time: String,
    pub first_time_setup: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: false,
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            first_time_setup: true,
        }
    }
}

/// Partial settings update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub notifications_enabled: Option<bool>,
    pub notification_time: Option<String>,
    pub first_time_setup: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    InvalidNotificationTime(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNotificationTime(value) => {
                write!(f, "invalid notification time `{value}`; expected HH:MM")
            }
        }
    }
}

impl Error for SettingsError {}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        parse_notification_time(&self.notification_time).map(|_| ())
    }

    /// Returns a validated copy with `patch` applied.
    pub fn merged(&self, patch: &SettingsPatch) -> Result<Self, SettingsError> {
        let mut next = self.clone();
        if let Some(enabled) = patch.notifications_enabled {
            next.notifications_enabled = enabled;
        }
        if let Some(time) = &patch.notification_time {
            next.notification_time = time.trim().to_string();
        }
        if let Some(first_time_setup) = patch.first_time_setup {
            next.first_time_setup = first_time_setup;
        }
        next.validate()?;
        Ok(next)
    }

    /// Next local date-time strictly after `now` at `notification_time`.
    ///
    /// Returns `None` when reminders are disabled or the stored time is
    /// invalid. A reminder time equal to `now` rolls over to tomorrow.
    pub fn next_reminder_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.notifications_enabled {
            return None;
        }
        let time = parse_notification_time(&self.notification_time).ok()?;
        let today_at = now.date().and_time(time);
        if today_at > now {
            return Some(today_at);
        }
        now.date()
            .checked_add_days(Days::new(1))
            .map(|tomorrow| tomorrow.and_time(time))
    }
}

fn parse_notification_time(value: &str) -> Result<NaiveTime, SettingsError> {
    let invalid = || SettingsError::InvalidNotificationTime(value.to_string());
    if !NOTIFICATION_TIME_RE.is_match(value) {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::{AppSettings, SettingsError, SettingsPatch};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn defaults_match_first_run_state() {
        let settings = AppSettings::default();
        assert!(!settings.notifications_enabled);
        assert_eq!(settings.notification_time, "19:00");
        assert!(settings.first_time_setup);
    }

    #[test]
    fn merged_rejects_bad_time() {
        let patch = SettingsPatch {
            notification_time: Some("25:61".to_string()),
            ..SettingsPatch::default()
        };
        let err = AppSettings::default().merged(&patch).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidNotificationTime("25:61".to_string())
        );
    }

    #[test]
    fn reminder_is_today_when_ahead_and_tomorrow_otherwise() {
        let settings = AppSettings {
            notifications_enabled: true,
            notification_time: "19:00".to_string(),
            first_time_setup: false,
        };
        assert_eq!(settings.next_reminder_after(at(10, 8, 30)), Some(at(10, 19, 0)));
        assert_eq!(settings.next_reminder_after(at(10, 19, 0)), Some(at(11, 19, 0)));
        assert_eq!(settings.next_reminder_after(at(10, 22, 15)), Some(at(11, 19, 0)));
    }

    #[test]
    fn reminder_is_none_when_disabled() {
        assert_eq!(AppSettings::default().next_reminder_after(at(10, 8, 0)), None);
    }
}
