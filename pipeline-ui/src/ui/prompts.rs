//! Prompt forms and the prompt library page

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{empty_as_none, DbId, Prompt, PromptInput, PromptStatus};
use serde::Deserialize;
use tracing::info;

use super::layout::{delete_button, escape, id_options, opt, status_options};
use super::render;
use crate::{AppState, ApiResult};

#[derive(Debug, Deserialize)]
pub struct PromptLibraryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    project_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    status: Option<PromptStatus>,
}

/// Prompt card with copy button, live status select and edit form
///
/// `context` is extra markup shown under the label (project, job).
pub(super) fn prompt_card(prompt: &Prompt, context: &str) -> String {
    format!(
        r#"<article class="card prompt status-{status}" data-prompt-id="{id}">
    <header><b>{label}</b> {context}</header>
    <pre class="prompt-text">{text}</pre>
    <button type="button" class="copy-prompt">Copy</button>
    <select class="prompt-status" data-prompt-id="{id}">{status_options}</select>
    <details><summary>Edit</summary>
    <form method="post" action="/prompts/edit/{id}">
        <input name="label" value="{label}" placeholder="Label">
        <textarea name="text">{text}</textarea>
        <textarea name="notes" placeholder="Notes">{notes}</textarea>
        <button>Save</button>
    </form>
    </details>
    {delete}
</article>"#,
        id = prompt.id,
        status = prompt.status,
        label = escape(&prompt.label),
        context = context,
        text = escape(&prompt.text),
        notes = escape(&prompt.notes),
        status_options = status_options(PromptStatus::ALL, Some(&prompt.status)),
        delete = delete_button(&format!("/prompts/delete/{}", prompt.id), "Delete"),
    )
}

/// Where prompt forms land: the owning project's journal, else the library
fn prompt_redirect(project_id: Option<DbId>) -> Redirect {
    match project_id {
        Some(id) => Redirect::to(&format!("/journal?project_id={}", id)),
        None => Redirect::to("/prompt-library"),
    }
}

/// GET /prompt-library?project_id=&status=
pub async fn prompt_library_page(
    State(state): State<AppState>,
    Query(query): Query<PromptLibraryQuery>,
) -> ApiResult<Html<String>> {
    let prompts = db::prompts::prompt_library(&state.db, query.project_id, query.status).await?;
    let projects = db::projects::list_projects_by_name(&state.db).await?;
    let jobs = db::jobs::list_jobs(&state.db, None).await?;

    let cards: String = prompts
        .iter()
        .map(|p| {
            let mut context = opt(&p.project_name);
            if let Some(job) = p.job_num {
                context.push_str(&format!(" · job #{} {}", job, opt(&p.character_name)));
            }
            prompt_card(&p.prompt, &format!("<small>{}</small>", context))
        })
        .collect();

    let body = format!(
        r#"<form method="get" action="/prompt-library" class="filters">
    <select name="project_id">{project_filter}</select>
    <select name="status"><option value="">any status</option>{status_filter}</select>
    <button>Filter</button>
</form>
<form method="post" action="/prompts/add" class="card">
    <select name="project_id">{project_options}</select>
    <select name="job_id">{job_options}</select>
    <input name="label" placeholder="Label">
    <textarea name="text" placeholder="Prompt text" required></textarea>
    <button>Add prompt</button>
</form>
<div class="cards">{cards}</div>"#,
        project_filter = id_options(&projects, query.project_id, |p| p.id, |p| p.name.clone()),
        status_filter = status_options(PromptStatus::ALL, query.status.as_ref()),
        project_options = id_options(&projects, None, |p| p.id, |p| p.name.clone()),
        job_options = id_options(&jobs, None, |j| j.job.id, |j| {
            format!("#{} {}", j.job.id, j.character_name.as_deref().unwrap_or_default())
        }),
        cards = cards,
    );

    Ok(render(&state, "Prompt Library", &body).await)
}

/// POST /prompts/add
pub async fn add_prompt(
    State(state): State<AppState>,
    Form(input): Form<PromptInput>,
) -> ApiResult<Redirect> {
    let id = db::prompts::create_prompt(&state.db, &input).await?;
    info!("Prompt {} added to project {:?}", id, input.project_id);
    Ok(prompt_redirect(input.project_id))
}

/// POST /prompts/edit/:id
pub async fn edit_prompt(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<PromptInput>,
) -> ApiResult<Redirect> {
    let existing = db::prompts::get_prompt(&state.db, id).await?;
    db::prompts::update_prompt(&state.db, id, &input).await?;
    Ok(prompt_redirect(existing.and_then(|p| p.project_id)))
}

/// POST /prompts/delete/:id
pub async fn delete_prompt(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    let existing = db::prompts::get_prompt(&state.db, id).await?;
    db::prompts::delete_prompt(&state.db, id).await?;
    Ok(prompt_redirect(existing.and_then(|p| p.project_id)))
}
