//! Async runtime seam for the song library workspace.
//!
//! Every other crate reaches Tokio through this crate only: the storage layer
//! uses [`time::timeout`] for operation deadlines, tests and binaries use the
//! `#[core_async::test]` / `#[core_async::main]` attributes, and concurrent
//! scenarios use [`task::spawn`].
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{timeout, Duration};
//!
//! # async fn example() {
//! let result = timeout(Duration::from_millis(50), async { 42 }).await;
//! assert_eq!(result.ok(), Some(42));
//! # }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, timeout, Duration, Instant};
