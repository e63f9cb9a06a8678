//! Projects and their job links

use crate::models::{DbId, Project, ProjectInput, ProjectJobLink, ProjectListing};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Projects newest first with distinct linked job and prompt counts
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectListing>> {
    let rows = sqlx::query_as::<_, ProjectListing>(
        r#"
        SELECT p.*, COUNT(DISTINCT pj.job_id) AS job_count, COUNT(DISTINCT pr.id) AS prompt_count
        FROM projects p
        LEFT JOIN project_jobs pj ON pj.project_id = p.id
        LEFT JOIN prompts pr ON pr.project_id = p.id
        GROUP BY p.id
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active projects by name
pub async fn list_active_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, Project>(
        "SELECT * FROM projects WHERE status = 'active' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every project by name
pub async fn list_projects_by_name(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get_project(pool: &SqlitePool, id: DbId) -> Result<Option<Project>> {
    let row = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create_project(pool: &SqlitePool, input: &ProjectInput) -> Result<DbId> {
    let result = sqlx::query(
        "INSERT INTO projects (name, description, status, notes) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.status)
    .bind(&input.notes)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_project(pool: &SqlitePool, id: DbId, input: &ProjectInput) -> Result<()> {
    sqlx::query("UPDATE projects SET name = ?, description = ?, status = ?, notes = ? WHERE id = ?")
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status)
        .bind(&input.notes)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a project with its job links and its prompts
pub async fn delete_project(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;
    for sql in [
        "DELETE FROM project_jobs WHERE project_id = ?",
        "DELETE FROM prompts WHERE project_id = ?",
        "DELETE FROM projects WHERE id = ?",
    ] {
        sqlx::query(sql).bind(id).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Deleted project {}", id);
    Ok(())
}

/// Jobs linked to a project, newest job first
pub async fn linked_jobs(pool: &SqlitePool, project_id: DbId) -> Result<Vec<ProjectJobLink>> {
    let rows = sqlx::query_as::<_, ProjectJobLink>(
        r#"
        SELECT pj.id AS link_id, rj.*, c.name AS character_name, ot.name AS output_type_name
        FROM project_jobs pj
        JOIN render_jobs rj ON pj.job_id = rj.id
        LEFT JOIN characters c ON rj.character_id = c.id
        LEFT JOIN output_types ot ON rj.output_type_id = ot.id
        WHERE pj.project_id = ?
        ORDER BY rj.created_at DESC, rj.id DESC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Link a job to a project unless it is already linked
///
/// Returns true when a link was created.
pub async fn link_job(pool: &SqlitePool, project_id: DbId, job_id: DbId) -> Result<bool> {
    let existing: Option<DbId> =
        sqlx::query_scalar("SELECT id FROM project_jobs WHERE project_id = ? AND job_id = ?")
            .bind(project_id)
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(false);
    }

    sqlx::query("INSERT INTO project_jobs (project_id, job_id) VALUES (?, ?)")
        .bind(project_id)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(true)
}

pub async fn unlink_job(pool: &SqlitePool, project_id: DbId, link_id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM project_jobs WHERE id = ? AND project_id = ?")
        .bind(link_id)
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}
