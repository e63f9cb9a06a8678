//! Output types page: types and the categories each one requires

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{DbId, OutputTypeInput, RequirementInput};

use super::layout::{delete_button, escape, id_options};
use super::render;
use crate::{AppState, ApiResult};

/// GET /output-types
pub async fn output_types_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = db::output_types::list_output_types(&state.db).await?;
    let categories = db::ingredients::list_categories_by_name(&state.db).await?;
    let requirements = db::output_types::list_requirements(&state.db).await?;

    let type_rows: String = items
        .iter()
        .map(|ot| {
            let required: Vec<String> = requirements
                .iter()
                .filter(|r| r.output_type_id == Some(ot.id))
                .map(|r| {
                    format!(
                        r#"<span class="chip">{} {}</span>"#,
                        escape(&r.category_name),
                        delete_button(&format!("/output-types/delete-requirement/{}", r.id), "×")
                    )
                })
                .collect();
            format!(
                r#"<tr>
    <td><b>{name}</b></td><td>{description}</td><td>{required}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/output-types/edit/{id}">
            <input name="name" value="{name}" required>
            <input name="description" value="{description}">
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                id = ot.id,
                name = escape(&ot.name),
                description = escape(&ot.description),
                required = required.join(" "),
                delete = delete_button(&format!("/output-types/delete/{}", ot.id), "Delete"),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="/output-types/add" class="card">
    <input name="name" placeholder="Name" required>
    <input name="description" placeholder="Description">
    <button>Add output type</button>
</form>
<form method="post" action="/output-types/add-requirement" class="card">
    <select name="output_type_id" required>{type_options}</select>
    requires
    <select name="category_id" required>{category_options}</select>
    <button>Add requirement</button>
</form>
<table><tr><th>Output type</th><th>Description</th><th>Required categories</th><th></th></tr>{type_rows}</table>"#,
        type_options = id_options(&items, None, |o| o.id, |o| o.name.clone()),
        category_options = id_options(&categories, None, |c| c.id, |c| c.name.clone()),
        type_rows = type_rows,
    );

    Ok(render(&state, "Output Types", &body).await)
}

/// POST /output-types/add
pub async fn add_output_type(
    State(state): State<AppState>,
    Form(input): Form<OutputTypeInput>,
) -> ApiResult<Redirect> {
    db::output_types::create_output_type(&state.db, &input).await?;
    state.flash.push("Output type added.").await;
    Ok(Redirect::to("/output-types"))
}

/// POST /output-types/edit/:id
pub async fn edit_output_type(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<OutputTypeInput>,
) -> ApiResult<Redirect> {
    db::output_types::update_output_type(&state.db, id, &input).await?;
    state.flash.push("Output type updated.").await;
    Ok(Redirect::to("/output-types"))
}

/// POST /output-types/delete/:id
pub async fn delete_output_type(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::output_types::delete_output_type(&state.db, id).await?;
    state.flash.push("Output type deleted.").await;
    Ok(Redirect::to("/output-types"))
}

/// POST /output-types/add-requirement
pub async fn add_requirement(
    State(state): State<AppState>,
    Form(input): Form<RequirementInput>,
) -> ApiResult<Redirect> {
    db::output_types::add_requirement(&state.db, input.output_type_id, input.category_id).await?;
    state.flash.push("Requirement added.").await;
    Ok(Redirect::to("/output-types"))
}

/// POST /output-types/delete-requirement/:id
pub async fn delete_requirement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::output_types::delete_requirement(&state.db, id).await?;
    Ok(Redirect::to("/output-types"))
}
