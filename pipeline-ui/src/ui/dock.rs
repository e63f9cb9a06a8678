//! Dock page: shortcut slots plus a compact job/prompt/media workflow

use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::DOCK_SLOTS;
use std::collections::HashMap;

use super::layout::{escape, id_options, opt};
use super::render;
use crate::{AppState, ApiResult};

/// GET /dock
pub async fn dock_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let slots = db::dock::list_slots(&state.db).await?;
    let jobs = db::jobs::active_jobs(&state.db, None).await?;
    let projects = db::projects::list_active_projects(&state.db).await?;

    let shortcuts: String = slots
        .iter()
        .filter(|s| !s.url.is_empty())
        .map(|s| format!(r#"<a class="dock-slot" href="{}">{}</a>"#, escape(&s.url), escape(&s.label)))
        .collect();

    let config_rows: String = slots
        .iter()
        .map(|s| {
            format!(
                r#"<div>{slot}. <input name="label_{slot}" value="{label}" placeholder="Label"> <input name="url_{slot}" value="{url}" placeholder="/path"></div>"#,
                slot = s.slot,
                label = escape(&s.label),
                url = escape(&s.url),
            )
        })
        .collect();

    let job_items: String = jobs
        .iter()
        .map(|j| {
            format!(
                r#"<li class="dock-job" data-job-id="{id}">#{id} {character} / {output_type} <small>{status}</small></li>"#,
                id = j.job.id,
                character = opt(&j.character_name),
                output_type = opt(&j.output_type_name),
                status = j.job.status,
            )
        })
        .collect();

    let body = format!(
        r#"<nav class="dock">{shortcuts}</nav>
<section class="dock-workflow">
    <label>Project <select id="dock-project">{project_options}</select></label>
    <ul id="dock-jobs">{job_items}</ul>
    <div id="dock-prompts"></div>
    <form id="dock-submit" class="card">
        <input type="hidden" name="job_id" id="dock-job-id">
        <input name="file_path" placeholder="File path or image URL">
        <button>Submit media</button>
        <span id="dock-result"></span>
    </form>
</section>
<details><summary>Configure shortcuts</summary>
<form method="post" action="/dock/config" class="card">
    {config_rows}
    <button>Save</button>
</form>
</details>"#,
        shortcuts = shortcuts,
        project_options = id_options(&projects, None, |p| p.id, |p| p.name.clone()),
        job_items = job_items,
        config_rows = config_rows,
    );

    Ok(render(&state, "Dock", &body).await)
}

/// POST /dock/config
///
/// Reads `label_1`..`label_5` and `url_1`..`url_5`; missing fields clear the slot.
pub async fn save_dock_config(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> ApiResult<Redirect> {
    let entries: Vec<(String, String)> = (1..=DOCK_SLOTS)
        .map(|slot| {
            (
                fields.get(&format!("label_{}", slot)).cloned().unwrap_or_default(),
                fields.get(&format!("url_{}", slot)).cloned().unwrap_or_default(),
            )
        })
        .collect();

    db::dock::save_slots(&state.db, &entries).await?;
    state.flash.push("Dock configuration saved.").await;
    Ok(Redirect::to("/dock"))
}
