//! # Desktop Bridge Implementations
//!
//! Native implementations of the bridge traits the song library needs
//! outside its own storage layer: currently an [`HttpClient`] on `reqwest`
//! used by the song-detail lookup.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HttpClientConfig, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::with_config(HttpClientConfig::default())?;
//! ```
//!
//! [`HttpClient`]: bridge_traits::http::HttpClient

mod http;

pub use http::{HttpClientConfig, ReqwestHttpClient};
