//! Attendance store and its invariant-maintenance routines.
//!
//! # Responsibility
//! - Own the canonical subject and attendance collections.
//! - Keep slot uniqueness and the no-orphan rule intact across mutations.
//! - Trigger persistence after every mutation.
//!
//! # Invariants
//! - Not-found conditions are no-ops or `None`, never errors.
//! - Persistence failures never roll back in-memory state.

pub mod attendance_store;
pub mod reconcile;
