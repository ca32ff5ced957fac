//! Persistence adapter contract and its implementations.
//!
//! # Responsibility
//! - Define the load/save contract the store depends on.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - Adapters store opaque JSON values per logical key; they never interpret
//!   collection contents.

pub mod kv_repo;
pub mod memory_repo;
