//! Domain model for subjects, attendance records and app preferences.
//!
//! # Responsibility
//! - Define canonical data structures used by store/statistics logic.
//! - Keep persisted JSON shapes stable across app versions.
//!
//! # Invariants
//! - Every subject and record is identified by a stable opaque string id.
//! - Attendance dates are pure calendar days, never timestamps.

pub mod attendance;
pub mod calendar;
pub mod settings;
pub mod subject;
