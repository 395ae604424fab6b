//! Runtime construction.
//!
//! The attribute macros expand to calls into this module, so the choice of
//! executor lives in one place.

use std::future::Future;
use std::io;

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Builds a single-threaded runtime with IO and timers enabled.
pub fn current_thread() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Builds a work-stealing runtime with IO and timers enabled.
///
/// `worker_threads` of `None` lets Tokio pick one worker per core.
pub fn multi_thread(worker_threads: Option<usize>) -> io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    if let Some(workers) = worker_threads {
        builder.worker_threads(workers.max(1));
    }
    builder.enable_all().build()
}

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be created (the OS refused an IO driver or
/// timer resource). There is no caller to report to at that point.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    match current_thread() {
        Ok(runtime) => runtime.block_on(future),
        Err(err) => panic!("core_async::runtime::block_on: failed to build runtime: {err}"),
    }
}

/// Runs the provided future to completion on a fresh multi-threaded runtime.
///
/// Used by `#[core_async::test(multi_thread)]` so spawned tasks really run in
/// parallel.
///
/// # Panics
///
/// Panics if the runtime cannot be created.
pub fn block_on_multi_thread<F>(future: F) -> F::Output
where
    F: Future,
{
    match multi_thread(None) {
        Ok(runtime) => runtime.block_on(future),
        Err(err) => {
            panic!("core_async::runtime::block_on_multi_thread: failed to build runtime: {err}")
        }
    }
}
