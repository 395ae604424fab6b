//! # Database Connection Pool Module
//!
//! Provides the SQLite connection pool and the schema migrator for the song
//! library.
//!
//! ## Features
//!
//! - **WAL Mode**: Enabled for better concurrency (multiple readers, one writer)
//! - **Connection Pooling**: Configurable min/max connections with timeouts
//! - **Foreign Keys**: Enforced, so deleting a song cascades to its detail row
//! - **Migrations**: Embedded in the binary or read from a directory at runtime
//! - **Health Checks**: Connection validation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_library::db::{create_pool, DatabaseConfig, MigrationSource};
//!
//! let config = DatabaseConfig::from_url("sqlite:library.db")
//!     .migrations(MigrationSource::Directory("./migrations".into()));
//! let pool = create_pool(config).await?;
//! ```
//!
//! ## Testing
//!
//! For tests, use in-memory databases:
//!
//! ```rust,ignore
//! let pool = create_test_pool().await?;
//! ```

use crate::{LibraryError, Result};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where schema migrations come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MigrationSource {
    /// The `migrations/` directory of this crate, compiled into the binary
    #[default]
    Embedded,
    /// A directory of `<version>_<description>.sql` files read at startup
    Directory(PathBuf),
}

/// Database configuration for SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:library.db` or `sqlite::memory:`
    pub database_url: String,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,

    /// Maximum idle time for a connection before being closed
    pub idle_timeout: Option<Duration>,

    /// Schema migrations applied by [`create_pool`]
    pub migrations: MigrationSource,
}

impl DatabaseConfig {
    /// Create a configuration for the database file at `database_path`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let config = DatabaseConfig::new("library.db");
    /// assert_eq!(config.database_url, "sqlite:library.db");
    /// ```
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        let path = database_path.into();
        Self::from_url(format!("sqlite:{}", path.display()))
    }

    /// Create a configuration from a full sqlx URL
    pub fn from_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            migrations: MigrationSource::Embedded,
        }
    }

    /// Create a configuration for an in-memory database (useful for testing)
    ///
    /// The pool keeps a single connection: the database lives exactly as
    /// long as that connection does.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: None,
            migrations: MigrationSource::Embedded,
        }
    }

    /// Set the minimum number of connections
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the maximum number of connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection acquire timeout
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the migration source
    pub fn migrations(mut self, source: MigrationSource) -> Self {
        self.migrations = source;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Create a configured SQLite connection pool
///
/// This function:
/// 1. Configures SQLite connection options (WAL mode, foreign keys, etc.)
/// 2. Creates a connection pool with the specified configuration
/// 3. Runs database migrations
/// 4. Performs a health check
///
/// # Errors
///
/// Returns an error if:
/// - The database URL is malformed or the file cannot be opened
/// - Migrations fail (`LibraryError::Migration`)
/// - Health check fails
pub async fn create_pool(config: DatabaseConfig) -> Result<Pool<Sqlite>> {
    info!(
        database_url = %config.database_url,
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        "Creating database connection pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(LibraryError::from)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true);

    debug!("SQLite connection options configured");

    let pool = SqlitePoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create connection pool");
            LibraryError::from(e)
        })?;

    info!(
        connections = pool.size(),
        "Database connection pool created successfully"
    );

    run_migrations(&pool, &config.migrations).await?;
    health_check(&pool).await?;

    Ok(pool)
}

/// Create a connection pool for testing with in-memory database
///
/// # Examples
///
/// ```rust,ignore
/// #[core_async::test]
/// async fn test_something() {
///     let pool = create_test_pool().await.unwrap();
/// }
/// ```
pub async fn create_test_pool() -> Result<Pool<Sqlite>> {
    create_pool(DatabaseConfig::in_memory()).await
}

/// Apply every pending migration from `source`.
///
/// A schema that is already current is left alone and counts as success.
///
/// # Errors
///
/// `LibraryError::Migration` if the directory cannot be read or a migration
/// fails to apply.
pub async fn run_migrations(pool: &Pool<Sqlite>, source: &MigrationSource) -> Result<()> {
    info!(source = ?source, "Running database migrations");

    let migrator = match source {
        MigrationSource::Embedded => sqlx::migrate!("./migrations"),
        MigrationSource::Directory(path) => Migrator::new(path.clone()).await.map_err(|e| {
            warn!(error = %e, path = %path.display(), "Cannot read migrations");
            LibraryError::Migration(e.to_string())
        })?,
    };

    migrator.run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        LibraryError::Migration(e.to_string())
    })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Perform a health check on the connection pool
pub async fn health_check(pool: &Pool<Sqlite>) -> Result<()> {
    debug!("Performing database health check");

    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| {
        warn!(error = %e, "Database health check failed");
        LibraryError::from(e)
    })?;

    debug!("Database health check passed");
    Ok(())
}
