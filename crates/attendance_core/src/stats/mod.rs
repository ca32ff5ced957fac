//! Derived attendance statistics.
//!
//! # Invariants
//! - Statistics are recomputed from live collections on every call; nothing
//!   is cached.

pub mod aggregator;
