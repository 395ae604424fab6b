//! Transaction coordination for repository operations.
//!
//! Every public operation follows the same shape:
//!
//! ```rust,ignore
//! let mut tx = adapter.begin().await?;
//! let outcome = do_work(tx.as_mut()).await;
//! transaction::finish(tx, outcome).await
//! ```
//!
//! `finish` commits on success and rolls back on any error, so a group
//! created early in an operation never survives a later failure. If the
//! whole operation is abandoned (deadline expiry) the transaction is dropped
//! and the adapter rolls it back.

use crate::error::{LibraryError, Result};
use bridge_traits::database::DatabaseTransaction;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Commits `tx` when `outcome` is `Ok`, rolls back otherwise.
///
/// A failed rollback is logged; the caller still gets `outcome`'s error.
pub async fn finish<T>(tx: Box<dyn DatabaseTransaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, cause = %err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Runs `operation` under an optional deadline.
///
/// On expiry the operation future is dropped together with any transaction
/// it holds, and [`LibraryError::DeadlineExceeded`] is returned.
pub async fn with_deadline<T, F>(deadline: Option<Duration>, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    core_async::time::with_deadline(deadline, operation)
        .await
        .map_err(|_| {
            let limit = deadline.unwrap_or_default();
            warn!(deadline = ?limit, "operation exceeded its deadline");
            LibraryError::DeadlineExceeded(limit)
        })?
}
