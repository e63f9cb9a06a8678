//! Top-layer clips page: composite clips built from linked render jobs

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{DbId, LinkJobInput, TopLayerInput};
use tracing::info;

use super::layout::{delete_button, escape, id_options, image_drop, opt, thumbnail};
use super::render;
use crate::{AppState, ApiResult};

/// GET /top-layer
pub async fn top_layer_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let clips = db::top_layer::list_clips(&state.db).await?;
    let all_jobs = db::jobs::list_jobs(&state.db, None).await?;

    let job_options = id_options(
        &all_jobs,
        None,
        |j| j.job.id,
        |j| {
            format!(
                "#{} {} / {}",
                j.job.id,
                j.character_name.as_deref().unwrap_or("?"),
                j.output_type_name.as_deref().unwrap_or("?")
            )
        },
    );

    let mut cards = String::new();
    for clip in &clips {
        let linked = db::top_layer::linked_jobs(&state.db, clip.id).await?;
        let linked_rows: String = linked
            .iter()
            .map(|l| {
                format!(
                    "<tr><td>#{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    l.job.job.id,
                    opt(&l.job.character_name),
                    opt(&l.job.output_type_name),
                    opt(&l.media_title),
                    opt(&l.media_tags),
                    l.quality_status.map(|q| q.to_string()).unwrap_or_default(),
                    delete_button(&format!("/top-layer/unlink-job/{}", l.link_id), "Unlink"),
                )
            })
            .collect();

        cards.push_str(&format!(
            r#"<article class="card clip" data-clip-id="{id}">
    {thumb}
    <h3>{title}</h3>
    <p>{description}</p>
    <p><small>{tags}</small></p>
    <table><tr><th>Job</th><th>Character</th><th>Output</th><th>Media</th><th>Tags</th><th>Quality</th><th></th></tr>{linked_rows}</table>
    <form method="post" action="/top-layer/link-job/{id}">
        <select name="job_id">{job_options}</select>
        <button>Link job</button>
    </form>
    <details><summary>Edit</summary>
    <form method="post" action="/top-layer/edit/{id}" class="clip-edit">
        <input name="title" value="{title}" placeholder="Title">
        <input name="file_path" value="{file_path}" placeholder="File path">
        <textarea name="description" placeholder="Description">{description}</textarea>
        <input name="tags" value="{tags}" placeholder="Tags">
        <input name="seo_title" value="{seo_title}" placeholder="SEO title">
        <textarea name="seo_description" placeholder="SEO description">{seo_description}</textarea>
        <textarea name="notes" placeholder="Notes">{notes}</textarea>
        <button type="button" class="clip-suggest" data-clip-id="{id}">Suggest from linked media</button>
        <button>Save</button>
    </form>
    </details>
    {delete}
</article>"#,
            id = clip.id,
            thumb = thumbnail(&clip.file_path),
            title = escape(&clip.title),
            file_path = escape(&clip.file_path),
            description = escape(&clip.description),
            tags = escape(&clip.tags),
            seo_title = escape(&clip.seo_title),
            seo_description = escape(&clip.seo_description),
            notes = escape(&clip.notes),
            linked_rows = linked_rows,
            job_options = job_options,
            delete = delete_button(&format!("/top-layer/delete/{}", clip.id), "Delete clip"),
        ));
    }

    let body = format!(
        r#"<form method="post" action="/top-layer/add" class="card">
    <input name="title" placeholder="Title">
    {drop}
    <textarea name="notes" placeholder="Notes"></textarea>
    <button>Add clip</button>
</form>
{cards}"#,
        drop = image_drop("file_path", ""),
        cards = cards,
    );

    Ok(render(&state, "Top Layer", &body).await)
}

/// POST /top-layer/add
pub async fn add_clip(
    State(state): State<AppState>,
    Form(input): Form<TopLayerInput>,
) -> ApiResult<Redirect> {
    let id = db::top_layer::create_clip(&state.db, &input).await?;
    info!("Top layer clip {} added", id);
    state.flash.push("Top layer clip added.").await;
    Ok(Redirect::to("/top-layer"))
}

/// POST /top-layer/edit/:id
pub async fn edit_clip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<TopLayerInput>,
) -> ApiResult<Redirect> {
    db::top_layer::update_clip(&state.db, id, &input).await?;
    state.flash.push("Clip updated.").await;
    Ok(Redirect::to("/top-layer"))
}

/// POST /top-layer/delete/:id
pub async fn delete_clip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::top_layer::delete_clip(&state.db, id).await?;
    state.flash.push("Clip deleted.").await;
    Ok(Redirect::to("/top-layer"))
}

/// POST /top-layer/link-job/:id
///
/// Linking an already linked job is a no-op.
pub async fn link_job(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<LinkJobInput>,
) -> ApiResult<Redirect> {
    if let Some(job_id) = input.job_id {
        db::top_layer::link_job(&state.db, id, job_id).await?;
    }
    Ok(Redirect::to("/top-layer"))
}

/// POST /top-layer/unlink-job/:id
pub async fn unlink_job(
    State(state): State<AppState>,
    Path(link_id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::top_layer::unlink_job(&state.db, link_id).await?;
    Ok(Redirect::to("/top-layer"))
}
