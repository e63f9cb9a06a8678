//! Media asset persistence

use crate::db::jobs;
use crate::derive::{derive_for_job, DerivedMeta};
use crate::models::{DbId, JobStatus, MediaInput, MediaListing, QualityStatus};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

const MEDIA_LISTING_SELECT: &str = r#"
    SELECT ma.*, c.name AS character_name, ot.name AS output_type_name
    FROM media_assets ma
    LEFT JOIN characters c ON ma.character_id = c.id
    LEFT JOIN output_types ot ON ma.output_type_id = ot.id
"#;

/// Media newest first, optionally filtered by review state and character
pub async fn list_media(
    pool: &SqlitePool,
    status: Option<QualityStatus>,
    character_id: Option<DbId>,
) -> Result<Vec<MediaListing>> {
    let sql = format!(
        r#"{}
        WHERE (? IS NULL OR ma.quality_status = ?)
          AND (? IS NULL OR ma.character_id = ?)
        ORDER BY ma.created_at DESC, ma.id DESC"#,
        MEDIA_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, MediaListing>(&sql)
        .bind(status)
        .bind(status)
        .bind(character_id)
        .bind(character_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn recent_media(pool: &SqlitePool, limit: i64) -> Result<Vec<MediaListing>> {
    let sql = format!(
        "{} ORDER BY ma.created_at DESC, ma.id DESC LIMIT ?",
        MEDIA_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, MediaListing>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create_media(pool: &SqlitePool, input: &MediaInput) -> Result<DbId> {
    let result = sqlx::query(
        r#"
        INSERT INTO media_assets (
            job_id, character_id, output_type_id, file_path, title, description,
            tags, seo_title, seo_description, quality_status, notes, prompt
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(input.job_id)
    .bind(input.character_id)
    .bind(input.output_type_id)
    .bind(&input.file_path)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(&input.seo_title)
    .bind(&input.seo_description)
    .bind(input.quality_status)
    .bind(&input.notes)
    .bind(&input.prompt)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Replace the descriptive fields of an asset
///
/// Job, character and output type references are fixed at import time.
pub async fn update_media(pool: &SqlitePool, id: DbId, input: &MediaInput) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE media_assets
        SET title = ?, file_path = ?, description = ?, tags = ?, seo_title = ?,
            seo_description = ?, quality_status = ?, notes = ?, prompt = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.file_path)
    .bind(&input.description)
    .bind(&input.tags)
    .bind(&input.seo_title)
    .bind(&input.seo_description)
    .bind(input.quality_status)
    .bind(&input.notes)
    .bind(&input.prompt)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_media_status(pool: &SqlitePool, id: DbId, status: QualityStatus) -> Result<()> {
    sqlx::query("UPDATE media_assets SET quality_status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_media(pool: &SqlitePool, id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM media_assets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Result of a quick media submission from the dock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedMedia {
    pub media_id: DbId,
    pub title: String,
}

/// Record a finished render for a job in one step
///
/// When the job exists its character and output type are copied onto the
/// new asset, title and tags are derived from it and the job is marked
/// complete. An unknown or missing job still produces an unreviewed asset
/// with empty metadata and no job reference.
pub async fn submit_media(
    pool: &SqlitePool,
    job_id: Option<DbId>,
    file_path: &str,
) -> Result<SubmittedMedia> {
    let mut tx = pool.begin().await?;

    let mut meta = DerivedMeta::default();
    let mut character_id = None;
    let mut output_type_id = None;
    let mut linked_job = None;

    if let Some(id) = job_id {
        if let Some(job) = jobs::get_job_detail(&mut *tx, id).await? {
            linked_job = Some(id);
            let ingredients = jobs::job_ingredients(&mut *tx, id).await?;
            meta = derive_for_job(&job, &ingredients);
            character_id = job.job.character_id;
            output_type_id = job.job.output_type_id;
            jobs::update_job_status(&mut *tx, id, JobStatus::Complete).await?;
        }
    }

    let media_id = sqlx::query(
        r#"
        INSERT INTO media_assets (job_id, character_id, output_type_id, file_path, title, tags, quality_status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(linked_job)
    .bind(character_id)
    .bind(output_type_id)
    .bind(file_path)
    .bind(&meta.title)
    .bind(&meta.tags)
    .bind(QualityStatus::Unreviewed)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;
    info!("Submitted media {} for job {:?}", media_id, job_id);

    Ok(SubmittedMedia {
        media_id,
        title: meta.title,
    })
}
