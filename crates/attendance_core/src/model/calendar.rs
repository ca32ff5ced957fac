//! Calendar-day helpers shared by store, statistics and FFI layers.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const DAY_SHORT: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// Returns the weekday index of `date` with `0 = Sunday`.
pub fn weekday_of(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Parses a strict `YYYY-MM-DD` calendar day.
///
/// Returns `None` for other shapes (including non zero-padded parts) and for
/// impossible dates such as `2024-02-30`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if !ISO_DATE_RE.is_match(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Formats a calendar day as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Full English day name for `weekday`, or `None` when out of range.
pub fn day_name(weekday: u8) -> Option<&'static str> {
    DAY_NAMES.get(usize::from(weekday)).copied()
}

/// Single-letter day label for `weekday`, or `None` when out of range.
pub fn day_short(weekday: u8) -> Option<&'static str> {
    DAY_SHORT.get(usize::from(weekday)).copied()
}

#[cfg(test)]
mod tests {
    use super::{day_name, day_short, format_date, parse_date, weekday_of};
    use chrono::NaiveDate;

    #[test]
    fn weekday_counts_from_sunday() {
        // 2024-01-07 was a Sunday, 2024-01-01 a Monday.
        assert_eq!(weekday_of(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()), 0);
        assert_eq!(weekday_of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 1);
        assert_eq!(weekday_of(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()), 6);
    }

    #[test]
    fn parse_date_is_strict() {
        assert_eq!(
            parse_date(" 2024-02-29 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("2024-2-29"), None);
        assert_eq!(parse_date("2023-02-29"), None);
        assert_eq!(parse_date("2024-02-29T10:00:00Z"), None);
    }

    #[test]
    fn format_and_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date), "2024-03-09");
        assert_eq!(day_name(0), Some("Sunday"));
        assert_eq!(day_short(4), Some("T"));
        assert_eq!(day_name(7), None);
    }
}
