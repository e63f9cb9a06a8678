//! Top-layer clips and their job links

use crate::aggregate::LinkedMedia;
use crate::models::{DbId, TopLayerInput, TopLayerLinkedJob, TopLayerMedia};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn list_clips(pool: &SqlitePool) -> Result<Vec<TopLayerMedia>> {
    let rows = sqlx::query_as::<_, TopLayerMedia>(
        "SELECT * FROM top_layer_media ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create_clip(pool: &SqlitePool, input: &TopLayerInput) -> Result<DbId> {
    let result = sqlx::query(
        r#"
        INSERT INTO top_layer_media (title, file_path, description, tags, seo_title, seo_description, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.file_path)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(&input.seo_title)
    .bind(&input.seo_description)
    .bind(&input.notes)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_clip(pool: &SqlitePool, id: DbId, input: &TopLayerInput) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE top_layer_media
        SET title = ?, file_path = ?, description = ?, tags = ?, seo_title = ?, seo_description = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.file_path)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(&input.seo_title)
    .bind(&input.seo_description)
    .bind(&input.notes)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_clip(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM top_layer_jobs WHERE top_layer_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM top_layer_media WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!("Deleted top-layer clip {}", id);
    Ok(())
}

/// Jobs linked to a clip, one row per media asset of each job
///
/// A job without media still appears once with empty media columns.
pub async fn linked_jobs(pool: &SqlitePool, top_layer_id: DbId) -> Result<Vec<TopLayerLinkedJob>> {
    let rows = sqlx::query_as::<_, TopLayerLinkedJob>(
        r#"
        SELECT tlj.id AS link_id, rj.*,
               c.name AS character_name, ot.name AS output_type_name,
               ma.title AS media_title, ma.tags AS media_tags, ma.description AS media_desc,
               ma.seo_title AS media_seo_title, ma.seo_description AS media_seo_desc,
               ma.quality_status
        FROM top_layer_jobs tlj
        JOIN render_jobs rj ON tlj.job_id = rj.id
        LEFT JOIN characters c ON rj.character_id = c.id
        LEFT JOIN output_types ot ON rj.output_type_id = ot.id
        LEFT JOIN media_assets ma ON ma.job_id = rj.id
        WHERE tlj.top_layer_id = ?
        ORDER BY tlj.id, ma.id
        "#,
    )
    .bind(top_layer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Media assets of every job linked to a clip, with the asset's character name
pub async fn linked_media(pool: &SqlitePool, top_layer_id: DbId) -> Result<Vec<LinkedMedia>> {
    let rows = sqlx::query_as::<_, LinkedMedia>(
        r#"
        SELECT ma.tags, ma.description, ma.seo_description, c.name AS character_name
        FROM top_layer_jobs tlj
        JOIN render_jobs rj ON tlj.job_id = rj.id
        JOIN media_assets ma ON ma.job_id = rj.id
        LEFT JOIN characters c ON ma.character_id = c.id
        WHERE tlj.top_layer_id = ?
        ORDER BY tlj.id, ma.id
        "#,
    )
    .bind(top_layer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Link a job to a clip unless it is already linked
///
/// Returns true when a link was created.
pub async fn link_job(pool: &SqlitePool, top_layer_id: DbId, job_id: DbId) -> Result<bool> {
    let existing: Option<DbId> =
        sqlx::query_scalar("SELECT id FROM top_layer_jobs WHERE top_layer_id = ? AND job_id = ?")
            .bind(top_layer_id)
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(false);
    }

    sqlx::query("INSERT INTO top_layer_jobs (top_layer_id, job_id) VALUES (?, ?)")
        .bind(top_layer_id)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(true)
}

pub async fn unlink_job(pool: &SqlitePool, link_id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM top_layer_jobs WHERE id = ?")
        .bind(link_id)
        .execute(pool)
        .await?;
    Ok(())
}
