//! # Song Library Core
//!
//! Owns the song catalog database and every rule about how it changes.
//!
//! ## Overview
//!
//! - SQLite schema and migrations ([`db`])
//! - Get-or-create resolution of groups by name
//! - Filtered, paginated reads and partial updates built from declarative
//!   descriptions ([`query`])
//! - One transaction per operation ([`transaction`])
//! - The [`LibraryRepository`] API: add, fetch text, delete, browse, update
//!
//! ## Example
//!
//! ```rust,ignore
//! use core_library::{db, LibraryRepository, NewSong, ReleaseDate, SqliteLibraryRepository};
//!
//! let pool = db::create_test_pool().await?;
//! let repo = SqliteLibraryRepository::from_pool(pool);
//! repo.add_song(&NewSong::new(
//!     "Queen",
//!     "Bohemian Rhapsody",
//!     "Is this the real life?",
//!     "http://x",
//!     ReleaseDate::parse("31.10.1975")?,
//! ))
//! .await?;
//! ```

pub mod adapters;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod repositories;
pub mod transaction;

pub use adapters::SqliteAdapter;
pub use db::{create_pool, create_test_pool, DatabaseConfig, MigrationSource};
pub use error::{LibraryError, Result};
pub use models::{
    Group, GroupId, LibraryEntry, NewSong, ReleaseDate, Song, SongChanges, SongDetail, SongId,
    SongIdentity,
};
pub use query::LibraryFilter;
pub use repositories::{
    LibraryPage, LibraryRepository, Page, PageRequest, SqliteLibraryRepository,
};
