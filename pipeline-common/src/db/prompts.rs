//! Prompt persistence

use crate::models::{DbId, Prompt, PromptInput, PromptListing, PromptStatus};
use crate::Result;
use sqlx::SqlitePool;

pub async fn get_prompt(pool: &SqlitePool, id: DbId) -> Result<Option<Prompt>> {
    let row = sqlx::query_as::<_, Prompt>("SELECT * FROM prompts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Add a prompt; new prompts always start pending
pub async fn create_prompt(pool: &SqlitePool, input: &PromptInput) -> Result<DbId> {
    let result = sqlx::query(
        "INSERT INTO prompts (project_id, job_id, text, label, status, notes) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(input.project_id)
    .bind(input.job_id)
    .bind(&input.text)
    .bind(&input.label)
    .bind(PromptStatus::Pending)
    .bind(&input.notes)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Replace a prompt's text, label and notes
///
/// Project, job and status are not touched; status moves through
/// [`update_prompt_status`].
pub async fn update_prompt(pool: &SqlitePool, id: DbId, input: &PromptInput) -> Result<()> {
    sqlx::query("UPDATE prompts SET text = ?, label = ?, notes = ? WHERE id = ?")
        .bind(&input.text)
        .bind(&input.label)
        .bind(&input.notes)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_prompt_status(pool: &SqlitePool, id: DbId, status: PromptStatus) -> Result<()> {
    sqlx::query("UPDATE prompts SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_prompt(pool: &SqlitePool, id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM prompts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Prompts of one project, newest first
pub async fn project_prompts(pool: &SqlitePool, project_id: DbId) -> Result<Vec<Prompt>> {
    let rows = sqlx::query_as::<_, Prompt>(
        "SELECT * FROM prompts WHERE project_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Prompt library listing, optionally filtered by project and status
pub async fn prompt_library(
    pool: &SqlitePool,
    project_id: Option<DbId>,
    status: Option<PromptStatus>,
) -> Result<Vec<PromptListing>> {
    let rows = sqlx::query_as::<_, PromptListing>(
        r#"
        SELECT p.*, proj.name AS project_name, rj.id AS job_num, c.name AS character_name
        FROM prompts p
        LEFT JOIN projects proj ON p.project_id = proj.id
        LEFT JOIN render_jobs rj ON p.job_id = rj.id
        LEFT JOIN characters c ON rj.character_id = c.id
        WHERE (? IS NULL OR p.project_id = ?)
          AND (? IS NULL OR p.status = ?)
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(project_id)
    .bind(project_id)
    .bind(status)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Prompts attached to a job directly or through a project the job is linked to
pub async fn job_prompts(pool: &SqlitePool, job_id: DbId) -> Result<Vec<Prompt>> {
    let rows = sqlx::query_as::<_, Prompt>(
        r#"
        SELECT p.* FROM prompts p
        WHERE p.job_id = ?
           OR p.project_id IN (SELECT project_id FROM project_jobs WHERE job_id = ?)
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .bind(job_id)
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
