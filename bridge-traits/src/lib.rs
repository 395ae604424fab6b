//! # Host Bridge Traits
//!
//! Contracts between the song library core and the collaborators it does not
//! own.
//!
//! ## Traits
//!
//! - [`DatabaseAdapter`](database::DatabaseAdapter) /
//!   [`DatabaseTransaction`](database::DatabaseTransaction) - connection pool
//!   and transaction primitive the repository runs every operation through
//! - [`HttpClient`](http::HttpClient) - async HTTP used by the song-detail lookup
//! - [`LoggerSink`](logging::LoggerSink) - leveled log forwarding to a host sink
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert driver errors into it and keep uniqueness failures apart as
//! [`BridgeError::ConstraintViolation`] so callers can treat them as retryable.
//!
//! ## Thread Safety
//!
//! Adapters and clients are `Send + Sync` so a single instance can be shared
//! across request workers behind an `Arc`. Transactions are `Send` but owned
//! by exactly one operation at a time.

pub mod database;
pub mod error;
pub mod http;
pub mod logging;

pub use error::BridgeError;

pub use database::{DatabaseAdapter, DatabaseTransaction, QueryRow, QueryValue, RowExt};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
