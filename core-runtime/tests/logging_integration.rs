//! Logging initialization from a loaded configuration.
//!
//! The global subscriber can only be installed once per process, so the
//! whole flow lives in a single test.

use bridge_traits::logging::LogLevel;
use core_runtime::config::ServiceConfig;
use core_runtime::logging::{init_logging, LogFormat};
use std::io::Write;

#[test]
fn test_env_file_logging_writes_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join(".log.txt");

    let mut env_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(env_file, "DATABASE_URL=sqlite::memory:").unwrap();
    writeln!(env_file, "SONG_INFO_URL=http://localhost:8081").unwrap();
    writeln!(env_file, "LOG_FILE={}", log_path.display()).unwrap();
    writeln!(env_file, "LOG_LEVEL=debug").unwrap();
    env_file.flush().unwrap();

    let config = ServiceConfig::from_env_file(env_file.path()).unwrap();
    assert_eq!(config.log_level, LogLevel::Debug);

    init_logging(config.logging_config().with_format(LogFormat::Json)).unwrap();

    tracing::info!(target: "core_library", group = "Queen", "song successfully added");
    tracing::debug!(target: "sqlx", "filtered out below warn");

    let written = std::fs::read_to_string(&log_path).unwrap();
    assert!(written.contains("song successfully added"));
    assert!(written.contains("\"group\":\"Queen\""));
    assert!(!written.contains("filtered out below warn"));

    let err = init_logging(config.logging_config()).unwrap_err();
    assert!(err.to_string().contains("Failed to initialize logging"));
}
