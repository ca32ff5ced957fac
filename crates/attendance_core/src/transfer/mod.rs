//! Attendance statistics exchange documents.
//!
//! # Responsibility
//! - Produce the JSON export consumed by file/share collaborators.
//! - Rebuild subjects and counts from a previously exported document.
//!
//! # Invariants
//! - Import never partially applies a rejected entry.
//! - Export reflects live store contents at the time of the call.

pub mod export;
pub mod import;
