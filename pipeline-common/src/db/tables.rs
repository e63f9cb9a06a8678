//! Table listing and row counts for the data page and export

use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Table metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Number of rows in table
    pub row_count: i64,
}

/// Names of all user tables in alphabetical order
///
/// SQLite internal tables and the `schema_version` ledger are excluded.
pub async fn user_table_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
          AND name != 'schema_version'
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// List all user tables with row counts
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<TableInfo>> {
    let mut table_infos = Vec::new();

    for name in user_table_names(pool).await? {
        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", name))
            .fetch_one(pool)
            .await?;

        table_infos.push(TableInfo { name, row_count });
    }

    Ok(table_infos)
}

/// Column names of `table` in declaration order
pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}
