//! Database Abstraction Layer
//!
//! The repository never talks to a driver directly. It asks a
//! [`DatabaseAdapter`] for a [`DatabaseTransaction`], runs every statement of
//! one logical operation through it, and then commits or rolls back.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::database::{DatabaseAdapter, QueryValue};
//!
//! let mut tx = adapter.begin().await?;
//! let rows = tx
//!     .query("SELECT id FROM groups WHERE name = ?1", &[QueryValue::from("Queen")])
//!     .await?;
//! tx.commit().await?;
//! ```
//!
//! ## Rollback on drop
//!
//! Implementations must roll back a transaction that is dropped without an
//! explicit `commit` or `rollback`. Deadline handling relies on this: a timed
//! out operation simply drops its transaction.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

// =============================================================================
// Query Result Types
// =============================================================================

/// Represents a single row from a database query as a map of column names to values
pub type QueryRow = std::collections::HashMap<String, QueryValue>;

/// Represents a database value that can be null, integer, real, text, or blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl QueryValue {
    /// Convert to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to f64 if possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Real(r) => Some(*r),
            QueryValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Convert to String if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Integer(i64::from(value))
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl<T> From<Option<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Typed column access on a [`QueryRow`].
///
/// Missing columns and type mismatches surface as
/// [`BridgeError::DatabaseError`] naming the column.
pub trait RowExt {
    fn get_i64(&self, column: &str) -> Result<i64>;
    fn get_string(&self, column: &str) -> Result<String>;
    fn get_optional_string(&self, column: &str) -> Option<String>;
}

impl RowExt for QueryRow {
    fn get_i64(&self, column: &str) -> Result<i64> {
        self.get(column).and_then(QueryValue::as_i64).ok_or_else(|| {
            BridgeError::DatabaseError(format!("Missing or invalid i64 column: {}", column))
        })
    }

    fn get_string(&self, column: &str) -> Result<String> {
        self.get(column)
            .and_then(QueryValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                BridgeError::DatabaseError(format!("Missing or invalid String column: {}", column))
            })
    }

    fn get_optional_string(&self, column: &str) -> Option<String> {
        self.get(column)
            .and_then(QueryValue::as_str)
            .map(str::to_string)
    }
}

// =============================================================================
// Adapter and Transaction Traits
// =============================================================================

/// Entry point to a database: hands out transactions.
///
/// ## Thread Safety
///
/// Implementations are shared between concurrent request workers, so they
/// must be `Send + Sync`. Each call to [`begin`](DatabaseAdapter::begin)
/// yields an independent transaction on its own connection.
#[async_trait::async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Begin a new transaction on a dedicated connection.
    async fn begin(&self) -> Result<Box<dyn DatabaseTransaction>>;

    /// Check if the database connection is healthy
    async fn health_check(&self) -> Result<()>;

    /// Close all database connections
    async fn close(&self) -> Result<()>;
}

/// An open transaction.
///
/// Statements use positional placeholders (`?1`, `?2`, ...) and `params`
/// binds in slice order.
///
/// # Safety
///
/// Never concatenate user input into `sql`; pass it through `params`.
#[async_trait::async_trait]
pub trait DatabaseTransaction: Send {
    /// Run a statement that returns rows.
    async fn query(&mut self, sql: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>>;

    /// Run a statement that does not return rows and report rows affected.
    async fn execute(&mut self, sql: &str, params: &[QueryValue]) -> Result<u64>;

    /// Run a query expected to return zero or one row.
    async fn query_optional(
        &mut self,
        sql: &str,
        params: &[QueryValue],
    ) -> Result<Option<QueryRow>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    /// Make every statement of this transaction visible to others.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard every statement of this transaction.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
