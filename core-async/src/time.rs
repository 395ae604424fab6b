//! Time-related operations.
//!
//! `timeout` is what the repository layer wraps each operation in when a
//! deadline is configured. Dropping the inner future on expiry drops any
//! open database transaction with it.

pub use tokio::time::{error::Elapsed, sleep, timeout, Sleep, Timeout};

pub use std::time::{Duration, Instant};

/// Runs `future` under an optional deadline.
///
/// `None` runs the future unbounded and never yields `Elapsed`.
pub async fn with_deadline<F>(deadline: Option<Duration>, future: F) -> Result<F::Output, Elapsed>
where
    F: std::future::Future,
{
    match deadline {
        Some(limit) => timeout(limit, future).await,
        None => Ok(future.await),
    }
}
