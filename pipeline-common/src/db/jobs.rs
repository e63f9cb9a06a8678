//! Render job persistence

use crate::models::{DbId, JobDetail, JobIngredient, JobInput, JobListing, JobStatus, RenderJob};
use crate::Result;
use sqlx::{Executor, Sqlite, SqlitePool};
use std::collections::HashSet;
use tracing::info;

/// Job columns joined with character and output type names
pub(crate) const JOB_LISTING_SELECT: &str = r#"
    SELECT rj.*, c.name AS character_name, ot.name AS output_type_name
    FROM render_jobs rj
    LEFT JOIN characters c ON rj.character_id = c.id
    LEFT JOIN output_types ot ON rj.output_type_id = ot.id
"#;

/// Jobs newest first, optionally restricted to one status
pub async fn list_jobs(pool: &SqlitePool, status: Option<JobStatus>) -> Result<Vec<JobListing>> {
    let sql = format!(
        "{} WHERE (? IS NULL OR rj.status = ?) ORDER BY rj.created_at DESC, rj.id DESC",
        JOB_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, JobListing>(&sql)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn recent_jobs(pool: &SqlitePool, limit: i64) -> Result<Vec<JobListing>> {
    let sql = format!(
        "{} ORDER BY rj.created_at DESC, rj.id DESC LIMIT ?",
        JOB_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, JobListing>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Rendered or complete jobs that have no media asset yet
pub async fn rendered_jobs_without_media(pool: &SqlitePool) -> Result<Vec<JobListing>> {
    let sql = format!(
        r#"{}
        WHERE rj.id NOT IN (SELECT DISTINCT job_id FROM media_assets WHERE job_id IS NOT NULL)
          AND rj.status IN ('rendered', 'complete')
        ORDER BY rj.created_at DESC, rj.id DESC"#,
        JOB_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, JobListing>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Newest 20 jobs still in flight, optionally only those linked to a project
pub async fn active_jobs(pool: &SqlitePool, project_id: Option<DbId>) -> Result<Vec<JobListing>> {
    let sql = format!(
        r#"{}
        WHERE rj.status IN ('planned', 'in_progress', 'rendered')
          AND (? IS NULL OR rj.id IN (SELECT job_id FROM project_jobs WHERE project_id = ?))
        ORDER BY rj.created_at DESC, rj.id DESC
        LIMIT 20"#,
        JOB_LISTING_SELECT
    );
    let rows = sqlx::query_as::<_, JobListing>(&sql)
        .bind(project_id)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Ids of jobs that have at least one media asset
pub async fn job_ids_with_media(pool: &SqlitePool) -> Result<HashSet<DbId>> {
    let ids: Vec<DbId> =
        sqlx::query_scalar("SELECT DISTINCT job_id FROM media_assets WHERE job_id IS NOT NULL")
            .fetch_all(pool)
            .await?;
    Ok(ids.into_iter().collect())
}

pub async fn get_job<'e, E>(executor: E, id: DbId) -> Result<Option<RenderJob>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, RenderJob>("SELECT * FROM render_jobs WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Job with the character fields used for title and tag derivation
pub async fn get_job_detail<'e, E>(executor: E, id: DbId) -> Result<Option<JobDetail>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, JobDetail>(
        r#"
        SELECT rj.*, c.name AS character_name, c.description AS char_desc,
               c.tags AS char_tags, ot.name AS output_type_name
        FROM render_jobs rj
        LEFT JOIN characters c ON rj.character_id = c.id
        LEFT JOIN output_types ot ON rj.output_type_id = ot.id
        WHERE rj.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Ingredients linked to a job, ordered by category name
///
/// Every caller that derives titles or tags goes through here so the
/// ingredient order, and therefore the derived text, is the same everywhere.
pub async fn job_ingredients<'e, E>(executor: E, job_id: DbId) -> Result<Vec<JobIngredient>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, JobIngredient>(
        r#"
        SELECT i.name, i.code, ic.name AS category_name
        FROM render_job_ingredients rji
        JOIN ingredients i ON rji.ingredient_id = i.id
        JOIN ingredient_categories ic ON i.category_id = ic.id
        WHERE rji.job_id = ?
        ORDER BY ic.name, rji.id
        "#,
    )
    .bind(job_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn create_job(pool: &SqlitePool, input: &JobInput) -> Result<DbId> {
    let result = sqlx::query(
        "INSERT INTO render_jobs (character_id, output_type_id, status, notes) VALUES (?, ?, ?, ?)",
    )
    .bind(input.character_id)
    .bind(input.output_type_id)
    .bind(input.status)
    .bind(&input.notes)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Create a job and link the chosen ingredients in one transaction
///
/// Ingredients are not checked against the output type's requirements.
pub async fn create_job_with_ingredients(
    pool: &SqlitePool,
    input: &JobInput,
    ingredient_ids: &[DbId],
) -> Result<DbId> {
    let mut tx = pool.begin().await?;

    let job_id = sqlx::query(
        "INSERT INTO render_jobs (character_id, output_type_id, status, notes) VALUES (?, ?, ?, ?)",
    )
    .bind(input.character_id)
    .bind(input.output_type_id)
    .bind(input.status)
    .bind(&input.notes)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for ingredient_id in ingredient_ids {
        sqlx::query("INSERT INTO render_job_ingredients (job_id, ingredient_id) VALUES (?, ?)")
            .bind(job_id)
            .bind(*ingredient_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!(
        "Created render job {} with {} ingredients",
        job_id,
        ingredient_ids.len()
    );
    Ok(job_id)
}

pub async fn update_job(pool: &SqlitePool, id: DbId, input: &JobInput) -> Result<()> {
    sqlx::query(
        "UPDATE render_jobs SET character_id = ?, output_type_id = ?, status = ?, notes = ? WHERE id = ?",
    )
    .bind(input.character_id)
    .bind(input.output_type_id)
    .bind(input.status)
    .bind(&input.notes)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_job_status<'e, E>(executor: E, id: DbId, status: JobStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE render_jobs SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Delete a job with its ingredient, clip and project links
///
/// Media assets and prompts that referenced the job are kept and detached.
pub async fn delete_job(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;

    for sql in [
        "DELETE FROM render_job_ingredients WHERE job_id = ?",
        "DELETE FROM top_layer_jobs WHERE job_id = ?",
        "DELETE FROM project_jobs WHERE job_id = ?",
        "UPDATE media_assets SET job_id = NULL WHERE job_id = ?",
        "UPDATE prompts SET job_id = NULL WHERE job_id = ?",
        "DELETE FROM render_jobs WHERE id = ?",
    ] {
        sqlx::query(sql).bind(id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    info!("Deleted render job {}", id);
    Ok(())
}
