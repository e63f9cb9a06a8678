//! Projects page and the per-project journal

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{
    empty_as_none, DbId, LinkJobInput, ProjectInput, ProjectStatus,
};
use serde::Deserialize;
use tracing::info;

use super::layout::{delete_button, escape, id_options, opt, status_options};
use super::prompts::prompt_card;
use super::render;
use crate::{AppState, ApiResult};

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    project_id: Option<DbId>,
}

fn journal_url(project_id: DbId) -> String {
    format!("/journal?project_id={}", project_id)
}

/// GET /projects
pub async fn projects_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = db::projects::list_projects(&state.db).await?;

    let rows: String = items
        .iter()
        .map(|item| {
            let p = &item.project;
            format!(
                r#"<tr class="status-{status}">
    <td><a href="{journal}"><b>{name}</b></a><br><small>{description}</small></td>
    <td>{status}</td>
    <td>{jobs}</td>
    <td>{prompts}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/projects/edit/{id}">
            <input name="name" value="{name}" required>
            <textarea name="description">{description}</textarea>
            <select name="status">{status_options}</select>
            <textarea name="notes">{notes}</textarea>
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                id = p.id,
                journal = journal_url(p.id),
                name = escape(&p.name),
                description = escape(&p.description),
                notes = escape(&p.notes),
                status = p.status,
                jobs = item.job_count,
                prompts = item.prompt_count,
                status_options = status_options(ProjectStatus::ALL, Some(&p.status)),
                delete = delete_button(&format!("/projects/delete/{}", p.id), "Delete"),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="/projects/add" class="card">
    <input name="name" placeholder="Project name" required>
    <textarea name="description" placeholder="Description"></textarea>
    <select name="status">{status_options}</select>
    <button>Create project</button>
</form>
<table><tr><th>Project</th><th>Status</th><th>Jobs</th><th>Prompts</th><th></th></tr>{rows}</table>"#,
        status_options = status_options(ProjectStatus::ALL, Some(&ProjectStatus::default())),
        rows = rows,
    );

    Ok(render(&state, "Projects", &body).await)
}

/// GET /journal?project_id=
pub async fn journal_page(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> ApiResult<Html<String>> {
    let active = db::projects::list_active_projects(&state.db).await?;
    let all_jobs = db::jobs::list_jobs(&state.db, None).await?;

    let tabs: String = active
        .iter()
        .map(|p| {
            format!(
                r#"<a href="{}"{}>{}</a>"#,
                journal_url(p.id),
                if query.project_id == Some(p.id) { r#" class="active""# } else { "" },
                escape(&p.name)
            )
        })
        .collect();

    let current = match query.project_id {
        Some(id) => db::projects::get_project(&state.db, id).await?,
        None => None,
    };

    let detail = match current {
        None => "<p>Select a project.</p>".to_string(),
        Some(project) => {
            let linked = db::projects::linked_jobs(&state.db, project.id).await?;
            let prompts = db::prompts::project_prompts(&state.db, project.id).await?;

            let job_rows: String = linked
                .iter()
                .map(|l| {
                    format!(
                        "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        l.job.job.id,
                        opt(&l.job.character_name),
                        opt(&l.job.output_type_name),
                        l.job.job.status,
                        delete_button(
                            &format!("/projects/{}/unlink-job/{}", project.id, l.link_id),
                            "Unlink"
                        ),
                    )
                })
                .collect();
            let prompt_cards: String = prompts
                .iter()
                .map(|p| {
                    let context = p
                        .job_id
                        .map(|j| format!("<small>job #{}</small>", j))
                        .unwrap_or_default();
                    prompt_card(p, &context)
                })
                .collect();
            let job_options = id_options(&all_jobs, None, |j| j.job.id, |j| {
                format!(
                    "#{} {} / {}",
                    j.job.id,
                    j.character_name.as_deref().unwrap_or("?"),
                    j.output_type_name.as_deref().unwrap_or("?")
                )
            });

            format!(
                r#"<section>
    <h3>{name}</h3>
    <p>{description}</p>
    <h4>Linked jobs</h4>
    <table><tr><th>Job</th><th>Character</th><th>Output</th><th>Status</th><th></th></tr>{job_rows}</table>
    <form method="post" action="/projects/{id}/link-job">
        <select name="job_id">{job_options}</select>
        <button>Link job</button>
    </form>
    <h4>Prompts</h4>
    <form method="post" action="/prompts/add" class="card">
        <input type="hidden" name="project_id" value="{id}">
        <select name="job_id">{job_options}</select>
        <input name="label" placeholder="Label">
        <textarea name="text" placeholder="Prompt text" required></textarea>
        <button>Add prompt</button>
    </form>
    <div class="cards">{prompt_cards}</div>
</section>"#,
                id = project.id,
                name = escape(&project.name),
                description = escape(&project.description),
                job_rows = job_rows,
                job_options = job_options,
                prompt_cards = prompt_cards,
            )
        }
    };

    let body = format!(r#"<nav class="filters">{}</nav>{}"#, tabs, detail);
    Ok(render(&state, "Journal", &body).await)
}

/// POST /projects/add
pub async fn add_project(
    State(state): State<AppState>,
    Form(input): Form<ProjectInput>,
) -> ApiResult<Redirect> {
    let id = db::projects::create_project(&state.db, &input).await?;
    info!("Project {} created: {}", id, input.name);
    state.flash.push("Project created.").await;
    Ok(Redirect::to("/projects"))
}

/// POST /projects/edit/:id
pub async fn edit_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<ProjectInput>,
) -> ApiResult<Redirect> {
    db::projects::update_project(&state.db, id, &input).await?;
    state.flash.push("Project updated.").await;
    Ok(Redirect::to("/projects"))
}

/// POST /projects/delete/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::projects::delete_project(&state.db, id).await?;
    state.flash.push("Project deleted.").await;
    Ok(Redirect::to("/projects"))
}

/// POST /projects/:id/link-job
pub async fn link_job(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<LinkJobInput>,
) -> ApiResult<Redirect> {
    if let Some(job_id) = input.job_id {
        db::projects::link_job(&state.db, id, job_id).await?;
    }
    Ok(Redirect::to(&journal_url(id)))
}

/// POST /projects/:id/unlink-job/:link_id
pub async fn unlink_job(
    State(state): State<AppState>,
    Path((id, link_id)): Path<(DbId, DbId)>,
) -> ApiResult<Redirect> {
    db::projects::unlink_job(&state.db, id, link_id).await?;
    Ok(Redirect::to(&journal_url(id)))
}
