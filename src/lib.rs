//! Workspace umbrella crate.
//!
//! Re-exports the song library so a host application can depend on
//! `songlib-workspace` alone. The `desktop-shims` feature (on by default)
//! adds the [`core_service`] façade with its reqwest-backed song-info client.

pub use core_library as library;

#[cfg(feature = "desktop-shims")]
pub use core_service::{bootstrap, start, CoreDependencies, CoreError, CoreService};
