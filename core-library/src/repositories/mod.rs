//! # Repository Pattern Implementation
//!
//! Data access for the song library.
//!
//! ## Architecture
//!
//! - [`LibraryRepository`] is the public surface; [`SqliteLibraryRepository`]
//!   implements it over any `DatabaseAdapter`
//! - `group` and `song` hold the statements one operation composes, each
//!   taking the operation's open transaction
//! - Paged reads are checked against a live row count before fetching

pub mod group;
pub mod library;
pub mod pagination;
pub mod song;

pub use group::{find_group_id, require_group, resolve_group};
pub use library::{LibraryRepository, SqliteLibraryRepository};
pub use pagination::{page_count, validate_page, LibraryPage, Page, PageRequest};
