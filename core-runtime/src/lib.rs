//! # Core Runtime Module
//!
//! Process-level infrastructure shared by the song library crates:
//! - Logging and tracing bootstrap
//! - Service configuration (builder and env-file loading)
//!
//! Nothing here touches the catalog itself; `core-service` reads a
//! [`ServiceConfig`](config::ServiceConfig), initializes logging from it and
//! wires the library together.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogDestination, LogFormat, LoggingConfig};
