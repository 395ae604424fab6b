//! # Song Details Lookup
//!
//! Fetches the lyrics, source URL and release date of a song from an
//! external song-info service before it is added to the library.
//!
//! ## Overview
//!
//! - [`SongInfoProvider`] is the seam the service layer depends on
//! - [`HttpSongInfoProvider`] talks to the service over the
//!   `bridge_traits::http::HttpClient` bridge

pub mod error;
pub mod song_info;

pub use error::{MetadataError, Result};
pub use song_info::{HttpSongInfoProvider, SongDetails, SongInfoProvider, SongInfoQuery};
