//! Ingredients page: categories, ingredients and advisory rules

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use pipeline_common::db;
use pipeline_common::models::{CategoryInput, DbId, IngredientInput, RuleInput};
use tracing::{info, warn};

use super::layout::{delete_button, escape, id_options, opt};
use super::render;
use crate::{AppState, ApiResult};

const RULE_TYPES: &[&str] = &["requires", "excludes", "pairs_with"];
const ENDPOINT_TYPES: &[&str] = &["ingredient", "category"];

fn text_options(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!(r#"<option value="{0}">{0}</option>"#, v))
        .collect()
}

/// GET /ingredients
pub async fn ingredients_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let categories = db::ingredients::list_categories(&state.db).await?;
    let ingredients = db::ingredients::list_ingredients(&state.db).await?;
    let rules = db::ingredients::list_rules(&state.db).await?;

    let category_rows: String = categories
        .iter()
        .map(|item| {
            let c = &item.category;
            format!(
                r#"<tr>
    <td><b>{name}</b></td><td>{description}</td><td>{count}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/ingredients/categories/edit/{id}">
            <input name="name" value="{name}" required>
            <input name="description" value="{description}">
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                id = c.id,
                name = escape(&c.name),
                description = escape(&c.description),
                count = item.item_count,
                delete = delete_button(
                    &format!("/ingredients/categories/delete/{}", c.id),
                    "Delete"
                ),
            )
        })
        .collect();

    let ingredient_rows: String = ingredients
        .iter()
        .map(|item| {
            let i = &item.ingredient;
            format!(
                r#"<tr>
    <td>{category}</td><td><code>{code}</code></td><td>{name}</td><td>{description}</td>
    <td>
        <details><summary>Edit</summary>
        <form method="post" action="/ingredients/edit/{id}">
            <select name="category_id" required>{category_options}</select>
            <input name="code" value="{code}">
            <input name="name" value="{name}" required>
            <input name="description" value="{description}">
            <button>Save</button>
        </form>
        </details>
        {delete}
    </td>
</tr>"#,
                id = i.id,
                category = escape(&item.category_name),
                code = escape(&i.code),
                name = escape(&i.name),
                description = escape(&i.description),
                category_options = id_options(
                    &categories,
                    i.category_id,
                    |c| c.category.id,
                    |c| c.category.name.clone()
                ),
                delete = delete_button(&format!("/ingredients/delete/{}", i.id), "Delete"),
            )
        })
        .collect();

    let rule_rows: String = rules
        .iter()
        .map(|item| {
            let r = &item.rule;
            let source = item.source_ing_name.as_ref().or(item.source_cat_name.as_ref()).cloned();
            let target = item.target_ing_name.as_ref().or(item.target_cat_name.as_ref()).cloned();
            format!(
                "<tr><td>{}</td><td>{} <small>({})</small></td><td>{} <small>({})</small></td><td>{}</td><td>{}</td></tr>",
                escape(&r.rule_type),
                opt(&source),
                escape(&r.source_type),
                opt(&target),
                escape(&r.target_type),
                escape(&r.notes),
                delete_button(&format!("/ingredients/rules/delete/{}", r.id), "Delete"),
            )
        })
        .collect();

    let category_options = id_options(
        &categories,
        None,
        |c| c.category.id,
        |c| c.category.name.clone(),
    );
    let ingredient_options = id_options(
        &ingredients,
        None,
        |i| i.ingredient.id,
        |i| format!("{}: {}", i.category_name, i.ingredient.name),
    );

    let body = format!(
        r#"<section>
    <h3>Categories</h3>
    <form method="post" action="/ingredients/categories/add" class="card">
        <input name="name" placeholder="Category name" required>
        <input name="description" placeholder="Description">
        <button>Add category</button>
    </form>
    <table><tr><th>Name</th><th>Description</th><th>Items</th><th></th></tr>{category_rows}</table>
</section>
<section>
    <h3>Ingredients</h3>
    <form method="post" action="/ingredients/add" class="card">
        <select name="category_id" required>{category_options}</select>
        <input name="code" placeholder="Code">
        <input name="name" placeholder="Name" required>
        <input name="description" placeholder="Description">
        <button>Add ingredient</button>
    </form>
    <table><tr><th>Category</th><th>Code</th><th>Name</th><th>Description</th><th></th></tr>{ingredient_rows}</table>
</section>
<section>
    <h3>Rules</h3>
    <form method="post" action="/ingredients/rules/add" class="card">
        <select name="rule_type">{rule_types}</select>
        <select name="source_type">{endpoint_types}</select>
        <select name="source_ingredient_id">{ingredient_options}</select>
        <select name="source_category_id">{category_options}</select>
        <select name="target_type">{endpoint_types}</select>
        <select name="target_ingredient_id">{ingredient_options}</select>
        <select name="target_category_id">{category_options}</select>
        <input name="notes" placeholder="Notes">
        <button>Add rule</button>
    </form>
    <table><tr><th>Rule</th><th>Source</th><th>Target</th><th>Notes</th><th></th></tr>{rule_rows}</table>
</section>"#,
        category_rows = category_rows,
        ingredient_rows = ingredient_rows,
        rule_rows = rule_rows,
        category_options = category_options,
        ingredient_options = ingredient_options,
        rule_types = text_options(RULE_TYPES),
        endpoint_types = text_options(ENDPOINT_TYPES),
    );

    Ok(render(&state, "Ingredients", &body).await)
}

/// POST /ingredients/categories/add
pub async fn add_category(
    State(state): State<AppState>,
    Form(input): Form<CategoryInput>,
) -> ApiResult<Redirect> {
    match db::ingredients::create_category(&state.db, &input).await {
        Ok(id) => {
            info!("Category {} added: {}", id, input.name);
            state.flash.push("Category added.").await;
        }
        Err(e) if e.is_unique_violation() => {
            warn!("Duplicate category name: {}", input.name);
            state.flash.push("Name already exists.").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/categories/edit/:id
pub async fn edit_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<CategoryInput>,
) -> ApiResult<Redirect> {
    match db::ingredients::update_category(&state.db, id, &input).await {
        Ok(()) => state.flash.push("Category updated.").await,
        Err(e) if e.is_unique_violation() => {
            warn!("Duplicate category name: {}", input.name);
            state.flash.push("Name already taken.").await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/categories/delete/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::ingredients::delete_category(&state.db, id).await?;
    state.flash.push("Category deleted.").await;
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/add
pub async fn add_ingredient(
    State(state): State<AppState>,
    Form(input): Form<IngredientInput>,
) -> ApiResult<Redirect> {
    db::ingredients::create_ingredient(&state.db, &input).await?;
    state.flash.push("Ingredient added.").await;
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/edit/:id
pub async fn edit_ingredient(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<IngredientInput>,
) -> ApiResult<Redirect> {
    db::ingredients::update_ingredient(&state.db, id, &input).await?;
    state.flash.push("Ingredient updated.").await;
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/delete/:id
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::ingredients::delete_ingredient(&state.db, id).await?;
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/rules/add
pub async fn add_rule(
    State(state): State<AppState>,
    Form(input): Form<RuleInput>,
) -> ApiResult<Redirect> {
    db::ingredients::create_rule(&state.db, &input).await?;
    state.flash.push("Rule added.").await;
    Ok(Redirect::to("/ingredients"))
}

/// POST /ingredients/rules/delete/:id
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Redirect> {
    db::ingredients::delete_rule(&state.db, id).await?;
    Ok(Redirect::to("/ingredients"))
}
