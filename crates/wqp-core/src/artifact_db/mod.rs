//! Persistent artifact store (SQLite via sqlx).
//!
//! Holds the latest inventory table and partition assignment table. Both are
//! full-overwrite artifacts: every write replaces the whole table in one
//! transaction and records a fresh indicator (hash + row count).

pub mod db;
pub mod types;

mod inventory;
mod partitions;

pub use db::*;
pub use types::*;
