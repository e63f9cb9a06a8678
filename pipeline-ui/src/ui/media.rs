//! Media library page and forms

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{
    empty_as_none, DbId, MediaInput, QualityStatus, QualityStatusInput,
};
use serde::Deserialize;
use tracing::info;

use super::layout::{
    delete_button, escape, id_options, image_drop, opt, status_options, status_select, thumbnail,
};
use super::{redirect_back, render};
use crate::{AppState, ApiResult};

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    status: Option<QualityStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    character_id: Option<DbId>,
}

fn job_label(id: DbId, character: &Option<String>, output_type: &Option<String>) -> String {
    format!(
        "#{} {} / {}",
        id,
        character.as_deref().unwrap_or("?"),
        output_type.as_deref().unwrap_or("?")
    )
}

/// GET /media?status=&character_id=
pub async fn media_page(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Html<String>> {
    let items = db::media::list_media(&state.db, query.status, query.character_id).await?;
    let pending_jobs = db::jobs::rendered_jobs_without_media(&state.db).await?;
    let all_jobs = db::jobs::list_jobs(&state.db, None).await?;
    let characters = db::characters::list_characters_by_name(&state.db).await?;
    let output_types = db::output_types::list_output_types(&state.db).await?;

    let job_options = id_options(
        &all_jobs,
        None,
        |j| j.job.id,
        |j| job_label(j.job.id, &j.character_name, &j.output_type_name),
    );

    let rows: String = items
        .iter()
        .map(|item| {
            let m = &item.media;
            format!(
                r#"<tr class="{annotated}">
    <td>{thumb}</td>
    <td><b>{title}</b><br><small>{character} · {output_type}{job}</small></td>
    <td>{tags}</td>
    <td><form method="post" action="/media/update-status/{id}">{status}</form></td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/media/edit/{id}">
            <input name="title" value="{title}" placeholder="Title">
            <input name="file_path" value="{file_path}" placeholder="File path">
            <textarea name="description" placeholder="Description">{description}</textarea>
            <input name="tags" value="{tags}" placeholder="Tags">
            <input name="seo_title" value="{seo_title}" placeholder="SEO title">
            <textarea name="seo_description" placeholder="SEO description">{seo_description}</textarea>
            <select name="quality_status">{status_options}</select>
            <textarea name="prompt" placeholder="Prompt">{prompt}</textarea>
            <textarea name="notes" placeholder="Notes">{notes}</textarea>
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                annotated = if m.is_fully_annotated() { "annotated" } else { "" },
                id = m.id,
                thumb = thumbnail(&m.file_path),
                title = escape(&m.title),
                character = opt(&item.character_name),
                output_type = opt(&item.output_type_name),
                job = m.job_id.map(|j| format!(" · job #{}", j)).unwrap_or_default(),
                file_path = escape(&m.file_path),
                description = escape(&m.description),
                tags = escape(&m.tags),
                seo_title = escape(&m.seo_title),
                seo_description = escape(&m.seo_description),
                prompt = escape(&m.prompt),
                notes = escape(&m.notes),
                status = status_select("quality_status", QualityStatus::ALL, &m.quality_status),
                status_options = status_options(QualityStatus::ALL, Some(&m.quality_status)),
                delete = delete_button(&format!("/media/delete/{}", m.id), "Delete"),
            )
        })
        .collect();

    let pending: String = pending_jobs
        .iter()
        .map(|j| {
            format!(
                r##"<li><a href="#" class="use-job" data-job-id="{}">{}</a></li>"##,
                j.job.id,
                escape(&job_label(j.job.id, &j.character_name, &j.output_type_name))
            )
        })
        .collect();

    let status_filter = format!(
        r#"<option value="">any status</option>{}"#,
        status_options(QualityStatus::ALL, query.status.as_ref())
    );

    let body = format!(
        r#"<form method="get" action="/media" class="filters">
    <select name="status">{status_filter}</select>
    <select name="character_id">{char_filter}</select>
    <button>Filter</button>
</form>
<section>
    <h3>Rendered jobs without media</h3>
    <ul class="pending-jobs">{pending}</ul>
</section>
<form method="post" action="/media/add" class="card" id="media-add">
    <select name="job_id" id="media-job">{job_options}</select>
    <select name="character_id">{char_options}</select>
    <select name="output_type_id">{ot_options}</select>
    {drop}
    <input name="title" placeholder="Title">
    <textarea name="description" placeholder="Description"></textarea>
    <input name="tags" placeholder="Tags">
    <input name="seo_title" placeholder="SEO title">
    <textarea name="seo_description" placeholder="SEO description"></textarea>
    <select name="quality_status">{status_options}</select>
    <textarea name="prompt" placeholder="Prompt"></textarea>
    <textarea name="notes" placeholder="Notes"></textarea>
    <button>Import asset</button>
</form>
<table>
    <tr><th></th><th>Asset</th><th>Tags</th><th>Quality</th><th></th></tr>
    {rows}
</table>"#,
        status_filter = status_filter,
        char_filter = id_options(&characters, query.character_id, |c| c.id, |c| c.name.clone()),
        pending = pending,
        job_options = job_options,
        char_options = id_options(&characters, None, |c| c.id, |c| c.name.clone()),
        ot_options = id_options(&output_types, None, |o| o.id, |o| o.name.clone()),
        drop = image_drop("file_path", ""),
        status_options = status_options(QualityStatus::ALL, Some(&QualityStatus::default())),
        rows = rows,
    );

    Ok(render(&state, "Media Library", &body).await)
}

/// POST /media/add
pub async fn add_media(
    State(state): State<AppState>,
    Form(input): Form<MediaInput>,
) -> ApiResult<Redirect> {
    let id = db::media::create_media(&state.db, &input).await?;
    info!("Media asset {} imported for job {:?}", id, input.job_id);
    state.flash.push("Media asset imported.").await;
    Ok(Redirect::to("/media"))
}

/// POST /media/edit/:id
pub async fn edit_media(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<MediaInput>,
) -> ApiResult<Redirect> {
    db::media::update_media(&state.db, id, &input).await?;
    state.flash.push("Asset updated.").await;
    Ok(Redirect::to("/media"))
}

/// POST /media/update-status/:id
pub async fn update_media_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
    Form(input): Form<QualityStatusInput>,
) -> ApiResult<Redirect> {
    db::media::update_media_status(&state.db, id, input.quality_status).await?;
    Ok(redirect_back(&headers, "/media"))
}

/// POST /media/delete/:id
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::media::delete_media(&state.db, id).await?;
    state.flash.push("Asset deleted.").await;
    Ok(Redirect::to("/media"))
}
