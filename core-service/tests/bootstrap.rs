//! Wiring the service from configuration against a real SQLite catalog.

#![cfg(feature = "desktop-shims")]

use core_library::{LibraryError, LibraryFilter, SongIdentity};
use core_runtime::config::ServiceConfig;
use core_service::{bootstrap, start, CoreError};
use std::io::Write;

fn in_memory_config() -> ServiceConfig {
    ServiceConfig::builder()
        .database_url("sqlite::memory:")
        .max_connections(1)
        .song_info_url("http://127.0.0.1:9")
        .default_page_size(5)
        .build()
        .unwrap()
}

#[core_async::test]
async fn test_bootstrap_serves_empty_catalog() {
    let core = bootstrap(&in_memory_config()).await.unwrap();

    let page = core
        .browse(&LibraryFilter::new(), None, None)
        .await
        .unwrap();
    assert_eq!(page.page_index, 0);
    assert_eq!(page.page_count, 0);
    assert!(page.entries.is_empty());

    let err = core
        .song_text(&SongIdentity::new("Queen", "Innuendo"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Library(LibraryError::GroupNotFound { .. })
    ));

    core.shutdown().await.unwrap();
}

#[core_async::test]
async fn test_bootstrap_reports_unreachable_song_info() {
    let core = bootstrap(&in_memory_config()).await.unwrap();

    let err = core
        .add_song(&SongIdentity::new("Queen", "Innuendo"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Metadata(_)));

    let page = core
        .browse(&LibraryFilter::new(), None, None)
        .await
        .unwrap();
    assert!(page.entries.is_empty());
}

#[core_async::test]
async fn test_bootstrap_rejects_missing_migrations_directory() {
    let mut config = in_memory_config();
    config.migrations_path = Some("/nonexistent/migrations".into());

    let err = bootstrap(&config).await.err().unwrap();
    assert!(matches!(
        err,
        CoreError::Library(LibraryError::Migration(_))
    ));
}

#[core_async::test]
async fn test_start_reads_env_file_and_logs_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join(".log.txt");
    let db_path = dir.path().join("library.db");

    let mut env_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(env_file, "DB_PATH={}", db_path.display()).unwrap();
    writeln!(env_file, "SONG_INFO_URL=http://127.0.0.1:9").unwrap();
    writeln!(env_file, "LOG_FILE={}", log_path.display()).unwrap();
    env_file.flush().unwrap();

    let core = start(Some(env_file.path())).await.unwrap();
    core.shutdown().await.unwrap();

    assert!(db_path.exists());
    let written = std::fs::read_to_string(&log_path).unwrap();
    assert!(written.contains("core service ready"));
}
