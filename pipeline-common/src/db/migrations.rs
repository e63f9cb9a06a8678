//! Database schema migrations
//!
//! Versioned, additive-only migrations tracked in the `schema_version` ledger.
//! Each migration runs in its own transaction together with its ledger row, so
//! a failure leaves the database at the previous version instead of half
//! applied.
//!
//! Databases created before the ledger existed (version 0 with tables already
//! present) upgrade cleanly: tables use `CREATE TABLE IF NOT EXISTS` and
//! column additions check `pragma_table_info` first. Errors are never
//! swallowed.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - add a new version instead
//! 2. **Additive only** - new tables, new columns, seeded rows
//! 3. **Check before altering** - use [`add_column_if_missing`]

use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i64 = 3;

/// Default dock shortcuts seeded by migration v3
pub const DEFAULT_DOCK_SLOTS: [(i64, &str, &str); 5] = [
    (1, "Job Builder", "/jobs/builder"),
    (2, "Render Jobs", "/jobs"),
    (3, "Media Library", "/media"),
    (4, "Journal", "/journal"),
    (5, "Dashboard", "/"),
];

const BASE_TABLES: &[(&str, &str)] = &[
    (
        "archetypes",
        r#"
        CREATE TABLE IF NOT EXISTS archetypes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            subtype TEXT NOT NULL DEFAULT 'concept',
            description TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "characters",
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            archetype_id INTEGER REFERENCES archetypes(id),
            description TEXT NOT NULL DEFAULT '',
            visual_notes TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'concept'
                CHECK (status IN ('concept', 'active', 'retired')),
            tags TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "ingredient_categories",
        r#"
        CREATE TABLE IF NOT EXISTS ingredient_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "ingredients",
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER REFERENCES ingredient_categories(id),
            code TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "output_types",
        r#"
        CREATE TABLE IF NOT EXISTS output_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "output_type_requirements",
        r#"
        CREATE TABLE IF NOT EXISTS output_type_requirements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            output_type_id INTEGER REFERENCES output_types(id),
            category_id INTEGER REFERENCES ingredient_categories(id)
        )
        "#,
    ),
    (
        "render_jobs",
        r#"
        CREATE TABLE IF NOT EXISTS render_jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            character_id INTEGER REFERENCES characters(id),
            output_type_id INTEGER REFERENCES output_types(id),
            status TEXT NOT NULL DEFAULT 'planned'
                CHECK (status IN ('planned', 'in_progress', 'rendered', 'complete')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "render_job_ingredients",
        r#"
        CREATE TABLE IF NOT EXISTS render_job_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id INTEGER REFERENCES render_jobs(id),
            ingredient_id INTEGER REFERENCES ingredients(id)
        )
        "#,
    ),
    (
        "media_assets",
        r#"
        CREATE TABLE IF NOT EXISTS media_assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id INTEGER REFERENCES render_jobs(id),
            character_id INTEGER REFERENCES characters(id),
            output_type_id INTEGER REFERENCES output_types(id),
            file_path TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            seo_title TEXT NOT NULL DEFAULT '',
            seo_description TEXT NOT NULL DEFAULT '',
            quality_status TEXT NOT NULL DEFAULT 'unreviewed'
                CHECK (quality_status IN ('unreviewed', 'approved', 'rejected')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "ingredient_rules",
        r#"
        CREATE TABLE IF NOT EXISTS ingredient_rules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rule_type TEXT NOT NULL,
            source_type TEXT NOT NULL,
            source_ingredient_id INTEGER REFERENCES ingredients(id),
            source_category_id INTEGER REFERENCES ingredient_categories(id),
            target_type TEXT NOT NULL,
            target_ingredient_id INTEGER REFERENCES ingredients(id),
            target_category_id INTEGER REFERENCES ingredient_categories(id),
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "top_layer_media",
        r#"
        CREATE TABLE IF NOT EXISTS top_layer_media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            file_path TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            seo_title TEXT NOT NULL DEFAULT '',
            seo_description TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "top_layer_jobs",
        r#"
        CREATE TABLE IF NOT EXISTS top_layer_jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            top_layer_id INTEGER REFERENCES top_layer_media(id),
            job_id INTEGER REFERENCES render_jobs(id)
        )
        "#,
    ),
];

const PROJECT_TABLES: &[(&str, &str)] = &[
    (
        "projects",
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'archived')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "project_jobs",
        r#"
        CREATE TABLE IF NOT EXISTS project_jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER REFERENCES projects(id),
            job_id INTEGER REFERENCES render_jobs(id)
        )
        "#,
    ),
    (
        "prompts",
        r#"
        CREATE TABLE IF NOT EXISTS prompts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER REFERENCES projects(id),
            job_id INTEGER REFERENCES render_jobs(id),
            text TEXT NOT NULL,
            label TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'collected', 'done', 'flagged')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    ),
    (
        "dock_config",
        r#"
        CREATE TABLE IF NOT EXISTS dock_config (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slot INTEGER NOT NULL,
            label TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL DEFAULT ''
        )
        "#,
    ),
];

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i64> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn set_schema_version(conn: &mut SqliteConnection, version: i64) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(conn)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    for version in (current_version + 1)..=CURRENT_SCHEMA_VERSION {
        let mut tx = pool.begin().await?;
        match version {
            1 => migrate_v1(&mut tx).await?,
            2 => migrate_v2(&mut tx).await?,
            3 => migrate_v3(&mut tx).await?,
            _ => unreachable!("no migration defined for v{}", version),
        }
        set_schema_version(&mut tx, version).await?;
        tx.commit().await?;
        info!("✓ Migration v{} completed", version);
    }

    info!("All migrations completed successfully");
    Ok(())
}

async fn table_exists(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?)",
    )
    .bind(table)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// True when `table` already has `column`
pub async fn column_exists(conn: &mut SqliteConnection, table: &str, column: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_one(conn)
            .await?;
    Ok(count > 0)
}

/// Add a column unless the table already has it
pub async fn add_column_if_missing(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    declaration: &str,
) -> Result<()> {
    if column_exists(&mut *conn, table, column).await? {
        info!("  {}.{} already exists - skipping", table, column);
        return Ok(());
    }

    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, declaration);
    sqlx::query(&sql).execute(&mut *conn).await?;
    info!("  ✓ Added {}.{}", table, column);
    Ok(())
}

async fn create_tables(conn: &mut SqliteConnection, tables: &[(&str, &str)]) -> Result<()> {
    for (name, sql) in tables {
        if table_exists(&mut *conn, name).await? {
            info!("  {} table already exists - keeping it", name);
            continue;
        }
        sqlx::query(sql).execute(&mut *conn).await?;
        info!("  ✓ Created {} table", name);
    }
    Ok(())
}

/// Migration v1: base catalogue, job and media tables
async fn migrate_v1(conn: &mut SqliteConnection) -> Result<()> {
    info!("Running migration v1: base tables");
    create_tables(conn, BASE_TABLES).await
}

/// Migration v2: archetype subtype and image references
///
/// `subtype` is part of the v1 archetypes table but databases created before
/// it was introduced lack the column.
async fn migrate_v2(conn: &mut SqliteConnection) -> Result<()> {
    info!("Running migration v2: archetype subtype and image paths");
    add_column_if_missing(
        &mut *conn,
        "archetypes",
        "subtype",
        "TEXT NOT NULL DEFAULT 'concept'",
    )
    .await?;
    add_column_if_missing(&mut *conn, "archetypes", "image_path", "TEXT NOT NULL DEFAULT ''").await?;
    add_column_if_missing(&mut *conn, "characters", "image_path", "TEXT NOT NULL DEFAULT ''").await?;
    Ok(())
}

/// Migration v3: projects, prompts, media prompt text and the dock
async fn migrate_v3(conn: &mut SqliteConnection) -> Result<()> {
    info!("Running migration v3: projects, prompts and dock");
    create_tables(&mut *conn, PROJECT_TABLES).await?;
    add_column_if_missing(&mut *conn, "media_assets", "prompt", "TEXT NOT NULL DEFAULT ''").await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dock_config")
        .fetch_one(&mut *conn)
        .await?;
    if count == 0 {
        for (slot, label, url) in DEFAULT_DOCK_SLOTS {
            sqlx::query("INSERT INTO dock_config (slot, label, url) VALUES (?, ?, ?)")
                .bind(slot)
                .bind(label)
                .bind(url)
                .execute(&mut *conn)
                .await?;
        }
        info!("  ✓ Seeded {} default dock slots", DEFAULT_DOCK_SLOTS.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database")
    }

    #[tokio::test]
    async fn test_fresh_database_reaches_current_version() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        let ledger: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(ledger, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let dock: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dock_config")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(dock, 5);
    }

    #[tokio::test]
    async fn test_legacy_database_gains_new_columns() {
        let pool = memory_pool().await;

        // Tables as they looked before subtype, image_path and prompt existed
        sqlx::query("CREATE TABLE archetypes (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, description TEXT DEFAULT '', tags TEXT DEFAULT '', created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO archetypes (name) VALUES ('Hero')")
            .execute(&pool)
            .await
            .unwrap();

        run_migrations(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(column_exists(&mut conn, "archetypes", "subtype").await.unwrap());
        assert!(column_exists(&mut conn, "archetypes", "image_path").await.unwrap());
        assert!(column_exists(&mut conn, "characters", "image_path").await.unwrap());
        assert!(column_exists(&mut conn, "media_assets", "prompt").await.unwrap());

        let subtype: String = sqlx::query_scalar("SELECT subtype FROM archetypes WHERE name = 'Hero'")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(subtype, "concept");
    }

    #[tokio::test]
    async fn test_dock_seed_defaults() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT slot, label, url FROM dock_config ORDER BY slot")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], (1, "Job Builder".to_string(), "/jobs/builder".to_string()));
        assert_eq!(rows[4], (5, "Dashboard".to_string(), "/".to_string()));
    }
}
