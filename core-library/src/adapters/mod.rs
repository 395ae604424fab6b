//! Database adapter implementations
//!
//! Concrete `DatabaseAdapter` backends. SQLite through `sqlx` is the only
//! one.

pub mod sqlite_native;

pub use sqlite_native::{SqliteAdapter, SqliteTransaction};
