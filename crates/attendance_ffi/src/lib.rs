//! Flutter-facing bridge over `attendance_core`.

pub mod api;
