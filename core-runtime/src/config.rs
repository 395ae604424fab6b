//! # Service Configuration
//!
//! Settings the song library needs at startup: where the catalog lives,
//! where schema migrations come from, where song details are looked up and
//! how to log.
//!
//! ## Usage
//!
//! ### Builder
//!
//! ```ignore
//! use core_runtime::config::ServiceConfig;
//!
//! let config = ServiceConfig::builder()
//!     .database_url("sqlite:/var/lib/songlib/library.db")
//!     .song_info_url("http://localhost:8081")
//!     .build()?;
//! ```
//!
//! ### Env file
//!
//! ```ignore
//! let config = ServiceConfig::from_env_file("config.env")?;
//! ```
//!
//! Recognized keys:
//!
//! | Key | Meaning | Default |
//! |-----|---------|---------|
//! | `DATABASE_URL` | sqlx connection string | - |
//! | `DB_PATH` | SQLite file, used when `DATABASE_URL` is absent | - |
//! | `DB_MIGRATIONS_PATH` | Runtime migrations directory | embedded |
//! | `DB_MAX_CONNECTIONS` | Pool size | 5 |
//! | `DB_TIMEOUT_SECS` | Per-operation deadline | none |
//! | `SONG_INFO_URL` | Base URL of the song-detail service | - |
//! | `DEFAULT_PAGE_SIZE` | Page size when a caller omits one | 20 |
//! | `LOG_FILE` | Append logs to this file instead of stdout | stdout |
//! | `LOG_LEVEL` | Minimum level | info |
//!
//! Variables already present in the process environment win over the file.

use crate::error::{Error, Result};
use crate::logging::{LogDestination, LoggingConfig};
use bridge_traits::logging::LogLevel;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env file read by [`ServiceConfig::from_default_env_file`].
pub const DEFAULT_ENV_FILE: &str = "config.env";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const KNOWN_KEYS: &[&str] = &[
    "DATABASE_URL",
    "DB_PATH",
    "DB_MIGRATIONS_PATH",
    "DB_MAX_CONNECTIONS",
    "DB_TIMEOUT_SECS",
    "SONG_INFO_URL",
    "DEFAULT_PAGE_SIZE",
    "LOG_FILE",
    "LOG_LEVEL",
];

/// Validated service configuration. Use [`ServiceConfig::builder`] or one of
/// the env loaders to construct it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_url: String,
    /// `None` runs the migrations compiled into `core-library`.
    pub migrations_path: Option<PathBuf>,
    pub max_connections: u32,
    /// Deadline applied to each repository operation.
    pub operation_timeout: Option<Duration>,
    /// Base URL without a trailing slash.
    pub song_info_url: String,
    pub default_page_size: u32,
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("Database URL cannot be empty".to_string()));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }

        if self.default_page_size == 0 {
            return Err(Error::Config(
                "DEFAULT_PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        if !(self.song_info_url.starts_with("http://") || self.song_info_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "SONG_INFO_URL must be an http(s) URL, got '{}'",
                self.song_info_url
            )));
        }

        if matches!(self.operation_timeout, Some(timeout) if timeout.is_zero()) {
            return Err(Error::Config(
                "DB_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Logging settings derived from `LOG_FILE` and `LOG_LEVEL`.
    pub fn logging_config(&self) -> LoggingConfig {
        let destination = match &self.log_file {
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::Stdout,
        };
        LoggingConfig::default()
            .with_level(self.log_level)
            .with_destination(destination)
    }

    /// Loads `./config.env` overlaid with the process environment.
    pub fn from_default_env_file() -> Result<Self> {
        Self::from_env_file(DEFAULT_ENV_FILE)
    }

    /// Loads a dotenv file overlaid with the process environment.
    ///
    /// The file is parsed without mutating the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            Error::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        let mut vars = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                Error::Config(format!("Malformed env file {}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }

        for key in KNOWN_KEYS {
            if let Ok(value) = std::env::var(key) {
                vars.insert((*key).to_string(), value);
            }
        }

        Self::from_vars(vars)
    }

    /// Loads configuration from the process environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            KNOWN_KEYS
                .iter()
                .filter_map(|key| std::env::var(key).ok().map(|v| ((*key).to_string(), v))),
        )
    }

    /// Builds configuration from key/value pairs. Empty values count as
    /// absent.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string());

        let mut builder = ServiceConfig::builder();

        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        } else if let Some(path) = get("DB_PATH") {
            builder = builder.database_path(path);
        }

        if let Some(path) = get("DB_MIGRATIONS_PATH") {
            builder = builder.migrations_path(path);
        }
        if let Some(value) = get("DB_MAX_CONNECTIONS") {
            builder = builder.max_connections(parse_number("DB_MAX_CONNECTIONS", &value)?);
        }
        if let Some(value) = get("DB_TIMEOUT_SECS") {
            let secs: u64 = parse_number("DB_TIMEOUT_SECS", &value)?;
            builder = builder.operation_timeout(Duration::from_secs(secs));
        }
        if let Some(url) = get("SONG_INFO_URL") {
            builder = builder.song_info_url(url);
        }
        if let Some(value) = get("DEFAULT_PAGE_SIZE") {
            builder = builder.default_page_size(parse_number("DEFAULT_PAGE_SIZE", &value)?);
        }
        if let Some(path) = get("LOG_FILE") {
            builder = builder.log_file(path);
        }
        if let Some(value) = get("LOG_LEVEL") {
            let level = value
                .parse::<LogLevel>()
                .map_err(|e| Error::Config(format!("LOG_LEVEL: {}", e)))?;
            builder = builder.log_level(level);
        }

        builder.build()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    database_url: Option<String>,
    migrations_path: Option<PathBuf>,
    max_connections: Option<u32>,
    operation_timeout: Option<Duration>,
    song_info_url: Option<String>,
    default_page_size: Option<u32>,
    log_file: Option<PathBuf>,
    log_level: Option<LogLevel>,
}

impl ServiceConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the database to a SQLite file, creating it on first use.
    pub fn database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_url = Some(format!("sqlite:{}", path.as_ref().display()));
        self
    }

    pub fn migrations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.migrations_path = Some(path.into());
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    pub fn song_info_url(mut self, url: impl Into<String>) -> Self {
        self.song_info_url = Some(url.into());
        self
    }

    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Builds the final `ServiceConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the database location or the song-info
    /// URL is missing, or if any value fails [`ServiceConfig::validate`].
    pub fn build(self) -> Result<ServiceConfig> {
        let database_url = self.database_url.ok_or_else(|| {
            Error::Config(
                "Database location is required. Set DATABASE_URL or DB_PATH.".to_string(),
            )
        })?;

        let song_info_url = self.song_info_url.ok_or_else(|| {
            Error::Config("Song info service URL is required. Set SONG_INFO_URL.".to_string())
        })?;

        let config = ServiceConfig {
            database_url,
            migrations_path: self.migrations_path,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            operation_timeout: self.operation_timeout,
            song_info_url: song_info_url.trim_end_matches('/').to_string(),
            default_page_size: self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            log_file: self.log_file,
            log_level: self.log_level.unwrap_or(LogLevel::Info),
        };

        config.validate()?;

        Ok(config)
    }
}
