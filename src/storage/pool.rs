//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent readers
//! - Automatic database file creation
//! - A single-connection pool for in-memory databases

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Shared handle to the history database.
pub type DbPool = Arc<SqlitePool>;

/// Path that selects a private in-memory database.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Initializes and returns a database connection pool for `db_path`.
///
/// Creates the database file if it doesn't exist and enables WAL mode. The
/// special path `:memory:` opens an in-memory database on a single
/// connection, so every query sees the same data.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<DbPool, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    if db_path_str == IN_MEMORY_DB {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        return Ok(Arc::new(pool));
    }

    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Database file created: {db_path_str}"),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Using existing database file: {db_path_str}")
        }
        Err(e) => {
            error!("Failed to create database file {db_path_str}: {e}");
            return Err(DatabaseError::FileCreationError(format!("{db_path_str}: {e}")));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{db_path_str}"))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_is_created_with_wal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.db");

        let pool = init_db_pool_with_path(&path).await.expect("pool");
        assert!(path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(pool.as_ref())
            .await
            .expect("pragma");
        assert_eq!(mode.to_lowercase(), "wal");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_missing_directory_is_file_creation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("history.db");

        let result = init_db_pool_with_path(&path).await;
        assert!(matches!(result, Err(DatabaseError::FileCreationError(_))));
    }

    #[tokio::test]
    async fn test_in_memory_pool() {
        let pool = init_db_pool_with_path(Path::new(IN_MEMORY_DB))
            .await
            .expect("pool");
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(pool.as_ref())
            .await
            .expect("create");
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(pool.as_ref())
            .await
            .expect("count");
        assert_eq!(n, 0);
    }
}
