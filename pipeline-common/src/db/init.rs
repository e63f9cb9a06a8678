//! Database initialization

use crate::db::migrations::run_migrations;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the database file and bring its schema current
///
/// Foreign keys, WAL journaling and the busy timeout are applied on every
/// pooled connection, not just the first one.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema applied
///
/// An in-memory SQLite database lives only as long as its connection, so the
/// pool is capped at one connection. Callers must not hold a transaction
/// while issuing queries against the pool.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_file_and_schema() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("nested").join("pipeline.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(fk, 1);

        let dock: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dock_config")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(dock, 5);
    }

    #[tokio::test]
    async fn test_reopen_existing_database() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("pipeline.db");

        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO output_types (name) VALUES ('Portrait')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = init_database(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM output_types")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
