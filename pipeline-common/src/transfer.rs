//! Whole-database JSON export and import
//!
//! Export dumps every user table. Import restores a fixed set of tables in
//! foreign-key order, drops unknown columns, skips rows whose id already
//! exists and counts rows the database refuses as skipped. Tables outside
//! the fixed set (projects, prompts, dock) are not restored.

use crate::db::tables::{table_columns, user_table_names};
use crate::{Error, Result};
use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::query::Query;
use sqlx::{Column, Row, Sqlite, SqliteConnection, SqlitePool, TypeInfo, ValueRef};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Format version written into every export
pub const EXPORT_VERSION: &str = "0.2";

/// Tables restored by import, parents before children
pub const IMPORT_ORDER: [&str; 12] = [
    "archetypes",
    "characters",
    "ingredient_categories",
    "ingredients",
    "output_types",
    "output_type_requirements",
    "render_jobs",
    "render_job_ingredients",
    "media_assets",
    "ingredient_rules",
    "top_layer_media",
    "top_layer_jobs",
];

/// One exported row: column name to value
pub type ExportRow = Map<String, Value>;

/// Export file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: String,
    pub version: String,
    pub tables: BTreeMap<String, Vec<ExportRow>>,
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Download name for an export taken at `now`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("pipeline_export_{}.json", now.format("%Y%m%d_%H%M"))
}

/// Dump every user table
///
/// Tables are read inside one transaction so the dump is a single snapshot.
pub async fn export_database(pool: &SqlitePool) -> Result<ExportDocument> {
    let names = user_table_names(pool).await?;

    let mut tx = pool.begin().await?;
    let tables = export_tables(&mut *tx, &names).await?;
    tx.commit().await?;

    let total: usize = tables.values().map(Vec::len).sum();
    info!("Exported {} rows from {} tables", total, tables.len());

    Ok(ExportDocument {
        exported_at: Utc::now().to_rfc3339(),
        version: EXPORT_VERSION.to_string(),
        tables,
    })
}

/// Read every row of `names` on an open connection or transaction
pub async fn export_tables(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<BTreeMap<String, Vec<ExportRow>>> {
    let mut tables = BTreeMap::new();

    for table in names {
        let rows = sqlx::query(&format!("SELECT * FROM \"{}\"", table))
            .fetch_all(&mut *conn)
            .await?;
        let rows = rows.iter().map(row_to_json).collect::<Result<Vec<_>>>()?;
        tables.insert(table.clone(), rows);
    }

    Ok(tables)
}

/// Convert a row using each value's storage class
fn row_to_json(row: &SqliteRow) -> Result<ExportRow> {
    let mut out = Map::new();

    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get::<i64, _>(i)?),
                "REAL" => Value::from(row.try_get::<f64, _>(i)?),
                "BLOB" => Value::String(BASE64_STANDARD.encode(row.try_get::<Vec<u8>, _>(i)?)),
                _ => Value::String(row.try_get::<String, _>(i)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}

/// Parse an uploaded export file
pub fn parse_export(bytes: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidInput(format!("file is not UTF-8: {}", e)))?;
    Ok(serde_json::from_str(text)?)
}

/// Restore rows from a parsed export document
///
/// Runs in one transaction. A row whose insert fails is counted as skipped
/// and does not stop the import. A missing or malformed `tables` section
/// imports nothing.
pub async fn import_database(pool: &SqlitePool, document: &Value) -> Result<ImportSummary> {
    let Some(tables) = document.get("tables").and_then(Value::as_object) else {
        warn!("Import document has no tables section");
        return Ok(ImportSummary::default());
    };

    // Column sets are read up front; the pool is not touched once the
    // transaction holds a connection.
    let mut columns_by_table = Vec::new();
    for table in IMPORT_ORDER {
        let rows = tables.get(table).and_then(Value::as_array);
        if let Some(rows) = rows.filter(|r| !r.is_empty()) {
            let columns: HashSet<String> = table_columns(pool, table).await?.into_iter().collect();
            columns_by_table.push((table, columns, rows));
        }
    }

    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;

    for (table, columns, rows) in columns_by_table {
        for row in rows {
            let Some(row) = row.as_object() else {
                continue;
            };
            let filtered: Vec<(&String, &Value)> =
                row.iter().filter(|(k, _)| columns.contains(*k)).collect();
            if filtered.is_empty() {
                continue;
            }

            if let Some(id) = row.get("id").filter(|_| columns.contains("id")) {
                let existing = bind_json(
                    sqlx::query(&format!("SELECT id FROM \"{}\" WHERE id = ?", table)),
                    id,
                )
                .fetch_optional(&mut *tx)
                .await?;
                if existing.is_some() {
                    summary.skipped += 1;
                    continue;
                }
            }

            let names: Vec<&str> = filtered.iter().map(|(k, _)| k.as_str()).collect();
            let placeholders = vec!["?"; names.len()].join(", ");
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                table,
                names.join(", "),
                placeholders
            );

            let mut query = sqlx::query(&sql);
            for (_, value) in &filtered {
                query = bind_json(query, value);
            }

            match query.execute(&mut *tx).await {
                Ok(_) => summary.imported += 1,
                Err(e) => {
                    debug!("Skipped {} row: {}", table, e);
                    summary.skipped += 1;
                }
            }
        }
    }

    tx.commit().await?;
    info!(
        "Import complete: {} rows added, {} skipped",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

/// Bind a JSON value with the closest SQLite type
fn bind_json<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(export_filename(at), "pipeline_export_20240309_0705.json");
    }

    #[test]
    fn test_parse_export_rejects_garbage() {
        assert!(parse_export(b"{not json").is_err());
        assert!(parse_export(&[0xff, 0xfe]).is_err());
        assert!(parse_export(br#"{"tables": {}}"#).is_ok());
    }
}
