//! CLI smoke entry point and attendance report.
//!
//! # Responsibility
//! - Verify `attendance_core` linkage with a deterministic ping.
//! - With a database path argument, print per-subject and overall statistics.

use attendance_core::db::open_db;
use attendance_core::{
    below_requirement, AttendanceStore, SqliteKvRepository, ATTENDANCE_REQUIREMENT,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("attendance_core ping={}", attendance_core::ping());
    println!("attendance_core version={}", attendance_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = AttendanceStore::open(SqliteKvRepository::new(&conn));
    let (held_subjects, held_records) = store.held_back();
    if held_subjects + held_records > 0 {
        println!("unreadable entries kept aside: subjects={held_subjects} records={held_records}");
    }
    let stats = store.per_subject_stats();

    for entry in &stats {
        println!(
            "{:<24} {:>4}/{:<4} {:>5.1}% {}",
            entry.subject_name,
            entry.present_classes,
            entry.total_classes,
            entry.attendance_percentage,
            entry.standing().label()
        );
    }

    let overall = store.overall_stats();
    println!(
        "overall present={} total={} percentage={:.1}%",
        overall.total_present, overall.total_classes, overall.overall_percentage
    );

    let flagged = below_requirement(&stats, ATTENDANCE_REQUIREMENT);
    if !flagged.is_empty() {
        println!(
            "{} subject(s) below {ATTENDANCE_REQUIREMENT}% requirement",
            flagged.len()
        );
    }

    ExitCode::SUCCESS
}
