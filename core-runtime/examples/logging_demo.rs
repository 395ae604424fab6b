//! Logging setup driven by an env file.
//!
//! Run with:
//! ```bash
//! # Reads ./config.env
//! cargo run --example logging_demo
//!
//! # Explicit env file, JSON output
//! cargo run --example logging_demo -- path/to/config.env json
//! ```

use core_runtime::config::ServiceConfig;
use core_runtime::logging::{init_logging, LogFormat};
use std::env;
use tracing::{debug, info, instrument, warn};

#[core_async::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let config = match args.get(1) {
        Some(path) => ServiceConfig::from_env_file(path),
        None => ServiceConfig::from_default_env_file(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cannot load configuration: {e}");
            std::process::exit(1);
        }
    };

    let format = match args.get(2).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    if let Err(e) = init_logging(config.logging_config().with_format(format)) {
        eprintln!("cannot initialize logging: {e}");
        std::process::exit(1);
    }

    info!(
        database_url = %config.database_url,
        song_info_url = %config.song_info_url,
        "configuration loaded"
    );
    add_song("Queen", "Bohemian Rhapsody");
}

#[instrument]
fn add_song(group: &str, song: &str) {
    debug!("group not found, adding it");
    warn!(url = "http://localhost:8081/info", "failed to get song info");
}
