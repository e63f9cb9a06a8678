//! Archetypes page and forms

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{ArchetypeInput, DbId, ImagePathInput};
use tracing::info;

use super::layout::{delete_button, escape, image_drop};
use super::render;
use crate::{AppState, ApiResult};

/// GET /archetypes
pub async fn archetypes_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = db::archetypes::list_archetypes(&state.db).await?;

    let rows: String = items
        .iter()
        .map(|item| {
            let a = &item.archetype;
            format!(
                r#"<tr>
    <td><form method="post" action="/archetypes/set-image/{id}" class="auto-submit">{drop}</form></td>
    <td><b>{name}</b><br><small>{subtype}</small></td>
    <td>{description}</td>
    <td>{tags}</td>
    <td>{chars}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/archetypes/edit/{id}">
            <input name="name" value="{name}" required>
            <input name="subtype" value="{subtype}">
            <textarea name="description">{description}</textarea>
            <input name="tags" value="{tags}">
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                drop = image_drop("image_path", &a.image_path),
                id = a.id,
                name = escape(&a.name),
                subtype = escape(&a.subtype),
                description = escape(&a.description),
                tags = escape(&a.tags),
                chars = item.char_count,
                delete = delete_button(&format!("/archetypes/delete/{}", a.id), "Delete"),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="/archetypes/add" class="card">
    <input name="name" placeholder="Name" required>
    <input name="subtype" placeholder="Subtype" value="concept">
    <textarea name="description" placeholder="Description"></textarea>
    <input name="tags" placeholder="tags, comma separated">
    {drop}
    <button>Add archetype</button>
</form>
<table>
    <tr><th></th><th>Archetype</th><th>Description</th><th>Tags</th><th>Characters</th><th></th></tr>
    {rows}
</table>"#,
        drop = image_drop("image_path", ""),
        rows = rows,
    );

    Ok(render(&state, "Archetypes", &body).await)
}

/// POST /archetypes/add
pub async fn add_archetype(
    State(state): State<AppState>,
    Form(input): Form<ArchetypeInput>,
) -> ApiResult<Redirect> {
    let id = db::archetypes::create_archetype(&state.db, &input).await?;
    info!("Archetype {} added: {}", id, input.name);
    state.flash.push("Archetype added.").await;
    Ok(Redirect::to("/archetypes"))
}

/// POST /archetypes/edit/:id
pub async fn edit_archetype(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<ArchetypeInput>,
) -> ApiResult<Redirect> {
    db::archetypes::update_archetype(&state.db, id, &input).await?;
    state.flash.push("Archetype updated.").await;
    Ok(Redirect::to("/archetypes"))
}

/// POST /archetypes/delete/:id
pub async fn delete_archetype(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::archetypes::delete_archetype(&state.db, id).await?;
    state.flash.push("Archetype deleted.").await;
    Ok(Redirect::to("/archetypes"))
}

/// POST /archetypes/set-image/:id
pub async fn set_archetype_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<ImagePathInput>,
) -> ApiResult<Redirect> {
    db::archetypes::set_archetype_image(&state.db, id, &input.image_path).await?;
    Ok(Redirect::to("/archetypes"))
}
