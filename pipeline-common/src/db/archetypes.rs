//! Archetype persistence

use crate::models::{Archetype, ArchetypeInput, ArchetypeListing, DbId};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Archetypes with the number of characters referencing each, by subtype then name
pub async fn list_archetypes(pool: &SqlitePool) -> Result<Vec<ArchetypeListing>> {
    let rows = sqlx::query_as::<_, ArchetypeListing>(
        r#"
        SELECT a.*, COUNT(c.id) AS char_count
        FROM archetypes a
        LEFT JOIN characters c ON c.archetype_id = a.id
        GROUP BY a.id
        ORDER BY a.subtype, a.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Archetypes by name, for select boxes
pub async fn list_archetypes_by_name(pool: &SqlitePool) -> Result<Vec<Archetype>> {
    let rows = sqlx::query_as::<_, Archetype>("SELECT * FROM archetypes ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create_archetype(pool: &SqlitePool, input: &ArchetypeInput) -> Result<DbId> {
    let result = sqlx::query(
        r#"
        INSERT INTO archetypes (name, subtype, description, tags, image_path)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.subtype)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(&input.image_path)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Replace every editable field of an archetype
///
/// The image reference is left alone; it has its own set-image form.
pub async fn update_archetype(pool: &SqlitePool, id: DbId, input: &ArchetypeInput) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE archetypes SET name = ?, subtype = ?, description = ?, tags = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.subtype)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_archetype_image(pool: &SqlitePool, id: DbId, image_path: &str) -> Result<()> {
    sqlx::query("UPDATE archetypes SET image_path = ? WHERE id = ?")
        .bind(image_path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an archetype; its characters stay and lose the reference
pub async fn delete_archetype(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE characters SET archetype_id = NULL WHERE archetype_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM archetypes WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Deleted archetype {}", id);
    Ok(())
}
