//! Character persistence

use crate::models::{Character, CharacterInput, CharacterListing, DbId};
use crate::Result;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

/// All characters with their archetype name, by name
pub async fn list_characters(pool: &SqlitePool) -> Result<Vec<CharacterListing>> {
    let rows = sqlx::query_as::<_, CharacterListing>(
        r#"
        SELECT c.*, a.name AS archetype_name
        FROM characters c
        LEFT JOIN archetypes a ON c.archetype_id = a.id
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Characters that are not retired, by name
pub async fn list_eligible_characters(pool: &SqlitePool) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, Character>(
        "SELECT * FROM characters WHERE status != 'retired' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every character including retired ones, by name
pub async fn list_characters_by_name(pool: &SqlitePool) -> Result<Vec<Character>> {
    let rows = sqlx::query_as::<_, Character>("SELECT * FROM characters ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get_character<'e, E>(executor: E, id: DbId) -> Result<Option<Character>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

pub async fn create_character(pool: &SqlitePool, input: &CharacterInput) -> Result<DbId> {
    let result = sqlx::query(
        r#"
        INSERT INTO characters (name, archetype_id, description, visual_notes, status, tags, image_path)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(input.archetype_id)
    .bind(&input.description)
    .bind(&input.visual_notes)
    .bind(input.status)
    .bind(&input.tags)
    .bind(&input.image_path)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update_character(pool: &SqlitePool, id: DbId, input: &CharacterInput) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE characters
        SET name = ?, archetype_id = ?, description = ?, visual_notes = ?, status = ?, tags = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(input.archetype_id)
    .bind(&input.description)
    .bind(&input.visual_notes)
    .bind(input.status)
    .bind(&input.tags)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_character_image(pool: &SqlitePool, id: DbId, image_path: &str) -> Result<()> {
    sqlx::query("UPDATE characters SET image_path = ? WHERE id = ?")
        .bind(image_path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a character; jobs and media that used it keep their rows
pub async fn delete_character(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE render_jobs SET character_id = NULL WHERE character_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE media_assets SET character_id = NULL WHERE character_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM characters WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Deleted character {}", id);
    Ok(())
}
