//! Render jobs page and the job builder

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{empty_as_none, DbId, JobInput, JobStatus, JobStatusInput};
use serde::Deserialize;
use tracing::info;

use super::layout::{delete_button, escape, id_options, opt, status_options, status_select};
use super::{redirect_back, render};
use crate::{AppState, ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    status: Option<JobStatus>,
}

/// GET /jobs/builder
pub async fn builder_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let characters = db::characters::list_eligible_characters(&state.db).await?;
    let output_types = db::output_types::list_output_types(&state.db).await?;
    let categories = db::ingredients::list_categories_by_name(&state.db).await?;

    let mut category_fields = String::new();
    for category in &categories {
        let ingredients = db::ingredients::ingredients_in_category(&state.db, category.id).await?;
        category_fields.push_str(&format!(
            r#"<label class="builder-category" data-category-id="{}">{} <select name="ingredient_ids">{}</select></label>"#,
            category.id,
            escape(&category.name),
            id_options(&ingredients, None, |i| i.id, |i| {
                if i.code.is_empty() {
                    i.name.clone()
                } else {
                    format!("{} {}", i.code, i.name)
                }
            }),
        ));
    }

    let body = format!(
        r#"<form method="post" action="/jobs/builder" id="job-builder" class="card">
    <label>Character <select name="character_id">{char_options}</select></label>
    <label>Output type <select name="output_type_id" id="builder-ot">{ot_options}</select></label>
    <div id="builder-requirements">{category_fields}</div>
    <label>Status <select name="status">{status_options}</select></label>
    <textarea name="notes" placeholder="Notes"></textarea>
    <button>Create render job</button>
</form>"#,
        char_options = id_options(&characters, None, |c| c.id, |c| c.name.clone()),
        ot_options = id_options(&output_types, None, |o| o.id, |o| o.name.clone()),
        category_fields = category_fields,
        status_options = status_options(JobStatus::ALL, Some(&JobStatus::default())),
    );

    Ok(render(&state, "Job Builder", &body).await)
}

/// Optional id from a form value; empty means none
fn parse_id(value: &str) -> ApiResult<Option<DbId>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", value)))
}

/// POST /jobs/builder
///
/// The builder posts one `ingredient_ids` value per required category, so the
/// form is read as raw pairs rather than a struct.
pub async fn create_from_builder(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> ApiResult<Redirect> {
    let mut input = JobInput {
        character_id: None,
        output_type_id: None,
        status: JobStatus::default(),
        notes: String::new(),
    };
    let mut ingredient_ids = Vec::new();

    for (key, value) in &fields {
        match key.as_str() {
            "character_id" => input.character_id = parse_id(value)?,
            "output_type_id" => input.output_type_id = parse_id(value)?,
            "status" if !value.is_empty() => input.status = value.parse::<JobStatus>()?,
            "notes" => input.notes = value.clone(),
            "ingredient_ids" => ingredient_ids.extend(parse_id(value)?),
            _ => {}
        }
    }

    let job_id = db::jobs::create_job_with_ingredients(&state.db, &input, &ingredient_ids).await?;
    state
        .flash
        .push(format!("Render job #{} created from builder.", job_id))
        .await;
    Ok(Redirect::to("/jobs"))
}

/// GET /jobs?status=
pub async fn jobs_page(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> ApiResult<Html<String>> {
    let items = db::jobs::list_jobs(&state.db, query.status).await?;
    let with_media = db::jobs::job_ids_with_media(&state.db).await?;
    let characters = db::characters::list_eligible_characters(&state.db).await?;
    let output_types = db::output_types::list_output_types(&state.db).await?;

    let mut rows = String::new();
    for item in &items {
        let job = &item.job;
        let ingredients = db::jobs::job_ingredients(&state.db, job.id).await?;
        let chips: String = ingredients
            .iter()
            .map(|i| {
                format!(
                    r#"<span class="chip" title="{}">{}</span>"#,
                    escape(&i.category_name),
                    escape(&i.name)
                )
            })
            .collect();

        rows.push_str(&format!(
            r#"<tr>
    <td>#{id}{media_badge}</td>
    <td>{character}</td>
    <td>{output_type}</td>
    <td>{chips}</td>
    <td><form method="post" action="/jobs/update-status/{id}">{status}</form></td>
    <td>{notes}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/jobs/edit/{id}">
            <select name="character_id">{char_options}</select>
            <select name="output_type_id">{ot_options}</select>
            <select name="status">{status_options}</select>
            <textarea name="notes">{notes}</textarea>
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
            id = job.id,
            media_badge = if with_media.contains(&job.id) {
                r#" <span class="badge">media</span>"#
            } else {
                ""
            },
            character = opt(&item.character_name),
            output_type = opt(&item.output_type_name),
            chips = chips,
            status = status_select("status", JobStatus::ALL, &job.status),
            notes = escape(&job.notes),
            char_options = id_options(&characters, job.character_id, |c| c.id, |c| c.name.clone()),
            ot_options = id_options(&output_types, job.output_type_id, |o| o.id, |o| o.name.clone()),
            status_options = status_options(JobStatus::ALL, Some(&job.status)),
            delete = delete_button(&format!("/jobs/delete/{}", job.id), "Delete"),
        ));
    }

    let filter_links: String = std::iter::once(("", "all"))
        .chain(JobStatus::ALL.iter().map(|s| (s.as_str(), s.as_str())))
        .map(|(value, label)| {
            let current = query.status.map(|s| s.as_str()).unwrap_or_default();
            format!(
                r#"<a href="/jobs?status={}"{}>{}</a>"#,
                value,
                if current == value { r#" class="active""# } else { "" },
                label
            )
        })
        .collect();

    let body = format!(
        r#"<nav class="filters">{filter_links}</nav>
<form method="post" action="/jobs/add" class="card">
    <select name="character_id">{char_options}</select>
    <select name="output_type_id">{ot_options}</select>
    <select name="status">{status_options}</select>
    <input name="notes" placeholder="Notes">
    <button>Add job</button>
    <a href="/jobs/builder">Open builder</a>
</form>
<table>
    <tr><th>Job</th><th>Character</th><th>Output</th><th>Ingredients</th><th>Status</th><th>Notes</th><th></th></tr>
    {rows}
</table>"#,
        filter_links = filter_links,
        char_options = id_options(&characters, None, |c| c.id, |c| c.name.clone()),
        ot_options = id_options(&output_types, None, |o| o.id, |o| o.name.clone()),
        status_options = status_options(JobStatus::ALL, Some(&JobStatus::default())),
        rows = rows,
    );

    Ok(render(&state, "Render Jobs", &body).await)
}

/// POST /jobs/add
pub async fn add_job(
    State(state): State<AppState>,
    Form(input): Form<JobInput>,
) -> ApiResult<Redirect> {
    let id = db::jobs::create_job(&state.db, &input).await?;
    info!("Render job {} added", id);
    state.flash.push("Job added.").await;
    Ok(Redirect::to("/jobs"))
}

/// POST /jobs/edit/:id
pub async fn edit_job(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<JobInput>,
) -> ApiResult<Redirect> {
    db::jobs::update_job(&state.db, id, &input).await?;
    state.flash.push("Job updated.").await;
    Ok(Redirect::to("/jobs"))
}

/// POST /jobs/update-status/:id
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
    Form(input): Form<JobStatusInput>,
) -> ApiResult<Redirect> {
    db::jobs::update_job_status(&state.db, id, input.status).await?;
    Ok(redirect_back(&headers, "/jobs"))
}

/// POST /jobs/delete/:id
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::jobs::delete_job(&state.db, id).await?;
    state.flash.push("Job deleted.").await;
    Ok(Redirect::to("/jobs"))
}
