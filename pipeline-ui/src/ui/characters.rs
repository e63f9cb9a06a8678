//! Characters page and forms

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{CharacterInput, CharacterStatus, DbId, ImagePathInput};
use tracing::info;

use super::layout::{delete_button, escape, id_options, image_drop, opt, status_options};
use super::render;
use crate::{AppState, ApiResult};

/// GET /characters
pub async fn characters_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = db::characters::list_characters(&state.db).await?;
    let archetypes = db::archetypes::list_archetypes_by_name(&state.db).await?;

    let rows: String = items
        .iter()
        .map(|item| {
            let c = &item.character;
            format!(
                r#"<tr class="status-{status}">
    <td><form method="post" action="/characters/set-image/{id}" class="auto-submit">{drop}</form></td>
    <td><b>{name}</b><br><small>{archetype}</small></td>
    <td>{description}<br><small>{visual}</small></td>
    <td>{tags}</td>
    <td>{status}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/characters/edit/{id}">
            <input name="name" value="{name}" required>
            <select name="archetype_id">{archetype_options}</select>
            <textarea name="description">{description}</textarea>
            <textarea name="visual_notes">{visual}</textarea>
            <select name="status">{status_options}</select>
            <input name="tags" value="{tags}">
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                id = c.id,
                drop = image_drop("image_path", &c.image_path),
                name = escape(&c.name),
                archetype = opt(&item.archetype_name),
                description = escape(&c.description),
                visual = escape(&c.visual_notes),
                tags = escape(&c.tags),
                status = c.status,
                archetype_options =
                    id_options(&archetypes, c.archetype_id, |a| a.id, |a| a.name.clone()),
                status_options = status_options(CharacterStatus::ALL, Some(&c.status)),
                delete = delete_button(&format!("/characters/delete/{}", c.id), "Delete"),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="/characters/add" class="card">
    <input name="name" placeholder="Name" required>
    <select name="archetype_id">{archetype_options}</select>
    <textarea name="description" placeholder="Description"></textarea>
    <textarea name="visual_notes" placeholder="Visual notes"></textarea>
    <select name="status">{status_options}</select>
    <input name="tags" placeholder="tags, comma separated">
    {drop}
    <button>Add character</button>
</form>
<table>
    <tr><th></th><th>Character</th><th>Description</th><th>Tags</th><th>Status</th><th></th></tr>
    {rows}
</table>"#,
        archetype_options = id_options(&archetypes, None, |a| a.id, |a| a.name.clone()),
        status_options = status_options(CharacterStatus::ALL, Some(&CharacterStatus::default())),
        drop = image_drop("image_path", ""),
        rows = rows,
    );

    Ok(render(&state, "Characters", &body).await)
}

/// POST /characters/add
pub async fn add_character(
    State(state): State<AppState>,
    Form(input): Form<CharacterInput>,
) -> ApiResult<Redirect> {
    let id = db::characters::create_character(&state.db, &input).await?;
    info!("Character {} added: {}", id, input.name);
    state.flash.push("Character added.").await;
    Ok(Redirect::to("/characters"))
}

/// POST /characters/edit/:id
pub async fn edit_character(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<CharacterInput>,
) -> ApiResult<Redirect> {
    db::characters::update_character(&state.db, id, &input).await?;
    state.flash.push("Character updated.").await;
    Ok(Redirect::to("/characters"))
}

/// POST /characters/delete/:id
pub async fn delete_character(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::characters::delete_character(&state.db, id).await?;
    state.flash.push("Character deleted.").await;
    Ok(Redirect::to("/characters"))
}

/// POST /characters/set-image/:id
pub async fn set_character_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<ImagePathInput>,
) -> ApiResult<Redirect> {
    db::characters::set_character_image(&state.db, id, &input.image_path).await?;
    Ok(Redirect::to("/characters"))
}
