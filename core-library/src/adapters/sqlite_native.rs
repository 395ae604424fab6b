//! Native SQLite Database Adapter
//!
//! Implements `DatabaseAdapter` on top of a `sqlx` SQLite pool. Each
//! [`SqliteTransaction`] owns a pooled connection for its whole lifetime,
//! so every statement of one repository operation sees the same snapshot
//! and an abandoned transaction is rolled back when dropped.

use async_trait::async_trait;
use bridge_traits::database::{DatabaseAdapter, DatabaseTransaction, QueryRow, QueryValue};
use bridge_traits::error::{BridgeError, Result};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Pool, Row, Sqlite, Transaction};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// `SQLITE_BUSY`
const SQLITE_BUSY: i32 = 5;
/// `SQLITE_LOCKED`
const SQLITE_LOCKED: i32 = 6;

/// Native SQLite implementation of DatabaseAdapter
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: Pool<Sqlite>,
}

impl SqliteAdapter {
    /// Wrap an already configured and migrated pool.
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// Convert a sqlx Row to a QueryRow (HashMap)
fn row_to_query_row(row: &SqliteRow) -> QueryRow {
    let mut result = HashMap::new();

    for column in row.columns() {
        let ordinal = column.ordinal();

        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(ordinal) {
            v.map(QueryValue::Integer).unwrap_or(QueryValue::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(ordinal) {
            v.map(QueryValue::Real).unwrap_or(QueryValue::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(ordinal) {
            v.map(QueryValue::Text).unwrap_or(QueryValue::Null)
        } else if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(ordinal) {
            v.map(QueryValue::Blob).unwrap_or(QueryValue::Null)
        } else {
            QueryValue::Null
        };

        result.insert(column.name().to_string(), value);
    }

    result
}

/// Bind positional parameters in slice order
fn bind_params<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [QueryValue],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    let mut query = query;
    for param in params {
        query = match param {
            QueryValue::Null => query.bind(None::<i64>),
            QueryValue::Integer(i) => query.bind(*i),
            QueryValue::Real(r) => query.bind(*r),
            QueryValue::Text(s) => query.bind(s.as_str()),
            QueryValue::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

/// Whether an extended SQLite result code reports lock contention.
fn is_contention_code(code: &str) -> bool {
    code.parse::<i32>()
        .map(|extended| matches!(extended & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Sort a driver error into the bridge taxonomy.
///
/// Constraint failures and lock contention keep their own variants because
/// callers may retry them; everything else is an opaque database error.
fn map_sqlx_error(context: &str, err: sqlx::Error) -> BridgeError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return BridgeError::ConstraintViolation(db_err.message().to_string());
        }
        if db_err.code().is_some_and(|code| is_contention_code(&code)) {
            return BridgeError::Busy(db_err.message().to_string());
        }
    }
    BridgeError::DatabaseError(format!("{}: {}", context, err))
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn begin(&self) -> Result<Box<dyn DatabaseTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Begin transaction failed", e))?;

        debug!("Transaction started");
        Ok(Box::new(SqliteTransaction { tx }))
    }

    async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Database health check failed");
                BridgeError::DatabaseError(format!("Health check failed: {}", e))
            })?;

        debug!("Database health check passed");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        info!("Closing database connection pool");
        self.pool.close().await;
        Ok(())
    }
}

/// An open SQLite transaction on a dedicated pooled connection.
///
/// Dropping it without `commit` rolls it back.
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl DatabaseTransaction for SqliteTransaction {
    async fn query(&mut self, sql: &str, params: &[QueryValue]) -> Result<Vec<QueryRow>> {
        debug!(query = %sql, param_count = params.len(), "Executing query");

        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("Query failed", e))?;

        let result: Vec<QueryRow> = rows.iter().map(row_to_query_row).collect();

        debug!(row_count = result.len(), "Query executed successfully");
        Ok(result)
    }

    async fn execute(&mut self, sql: &str, params: &[QueryValue]) -> Result<u64> {
        debug!(statement = %sql, param_count = params.len(), "Executing statement");

        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("Execute failed", e))?;

        let rows_affected = result.rows_affected();
        debug!(rows_affected, "Statement executed successfully");
        Ok(rows_affected)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        debug!("Committing transaction");
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("Commit transaction failed", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        debug!("Rolling back transaction");
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("Rollback transaction failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::database::RowExt;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn adapter() -> SqliteAdapter {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, score REAL, data BLOB)")
            .execute(&pool)
            .await
            .unwrap();
        SqliteAdapter::from_pool(pool)
    }

    #[core_async::test]
    async fn test_commit_makes_rows_visible() {
        let adapter = adapter().await;

        let mut tx = adapter.begin().await.unwrap();
        let affected = tx
            .execute(
                "INSERT INTO items (name, score, data) VALUES (?1, ?2, ?3)",
                &[
                    QueryValue::from("a"),
                    QueryValue::Real(1.5),
                    QueryValue::Blob(vec![1, 2]),
                ],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);
        tx.commit().await.unwrap();

        let mut tx = adapter.begin().await.unwrap();
        let rows = tx
            .query("SELECT id, name, score, data FROM items", &[])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_string("name").unwrap(), "a");
        assert_eq!(rows[0].get("score"), Some(&QueryValue::Real(1.5)));
        assert_eq!(rows[0].get("data"), Some(&QueryValue::Blob(vec![1, 2])));
    }

    #[core_async::test]
    async fn test_rollback_discards_rows() {
        let adapter = adapter().await;

        let mut tx = adapter.begin().await.unwrap();
        tx.execute("INSERT INTO items (name) VALUES (?1)", &[QueryValue::from("a")])
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut tx = adapter.begin().await.unwrap();
        let rows = tx.query("SELECT id FROM items", &[]).await.unwrap();
        tx.commit().await.unwrap();
        assert!(rows.is_empty());
    }

    #[core_async::test]
    async fn test_dropped_transaction_rolls_back() {
        let adapter = adapter().await;

        {
            let mut tx = adapter.begin().await.unwrap();
            tx.execute("INSERT INTO items (name) VALUES (?1)", &[QueryValue::from("a")])
                .await
                .unwrap();
        }

        let mut tx = adapter.begin().await.unwrap();
        let rows = tx.query("SELECT id FROM items", &[]).await.unwrap();
        tx.commit().await.unwrap();
        assert!(rows.is_empty());
    }

    #[core_async::test]
    async fn test_unique_violation_is_constraint_violation() {
        let adapter = adapter().await;

        let mut tx = adapter.begin().await.unwrap();
        tx.execute("INSERT INTO items (name) VALUES (?1)", &[QueryValue::from("a")])
            .await
            .unwrap();
        let err = tx
            .execute("INSERT INTO items (name) VALUES (?1)", &[QueryValue::from("a")])
            .await
            .unwrap_err();

        assert!(err.is_constraint_violation());
    }

    #[core_async::test]
    async fn test_null_parameter_and_column() {
        let adapter = adapter().await;

        let mut tx = adapter.begin().await.unwrap();
        tx.execute(
            "INSERT INTO items (name, score) VALUES (?1, ?2)",
            &[QueryValue::from("a"), QueryValue::Null],
        )
        .await
        .unwrap();
        let row = tx
            .query_optional("SELECT score FROM items WHERE name = ?1", &[QueryValue::from("a")])
            .await
            .unwrap()
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(row.get("score"), Some(&QueryValue::Null));
    }

    #[core_async::test]
    async fn test_health_check() {
        assert!(adapter().await.health_check().await.is_ok());
    }

    #[test]
    fn test_contention_codes() {
        assert!(is_contention_code("5"));
        assert!(is_contention_code("517"));
        assert!(is_contention_code("6"));
        assert!(is_contention_code("262"));
        assert!(!is_contention_code("2067"));
        assert!(!is_contention_code("not a number"));
    }
}
