//! Ingredient categories, ingredients and ingredient rules
//!
//! Rules are advisory metadata: they are stored and listed but nothing
//! enforces them when jobs are built.

use crate::models::{
    CategoryInput, CategoryListing, DbId, Ingredient, IngredientCategory, IngredientInput,
    IngredientListing, RuleInput, RuleListing,
};
use crate::Result;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

// ============================================================================
// Categories
// ============================================================================

/// Categories with their ingredient counts, by name
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<CategoryListing>> {
    let rows = sqlx::query_as::<_, CategoryListing>(
        r#"
        SELECT ic.*, COUNT(i.id) AS item_count
        FROM ingredient_categories ic
        LEFT JOIN ingredients i ON i.category_id = ic.id
        GROUP BY ic.id
        ORDER BY ic.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_categories_by_name(pool: &SqlitePool) -> Result<Vec<IngredientCategory>> {
    let rows =
        sqlx::query_as::<_, IngredientCategory>("SELECT * FROM ingredient_categories ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Create a category
///
/// Fails with a unique violation (see [`crate::Error::is_unique_violation`])
/// when the name is taken.
pub async fn create_category(pool: &SqlitePool, input: &CategoryInput) -> Result<DbId> {
    let result = sqlx::query("INSERT INTO ingredient_categories (name, description) VALUES (?, ?)")
        .bind(&input.name)
        .bind(&input.description)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_category(pool: &SqlitePool, id: DbId, input: &CategoryInput) -> Result<()> {
    sqlx::query("UPDATE ingredient_categories SET name = ?, description = ? WHERE id = ?")
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a category together with its ingredients and requirements
///
/// Rules that point at the category by id lose that reference; rules that
/// point at one of its ingredients are removed with the ingredient.
pub async fn delete_category(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;

    let ingredient_ids: Vec<DbId> =
        sqlx::query_scalar("SELECT id FROM ingredients WHERE category_id = ?")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
    for ingredient_id in &ingredient_ids {
        remove_ingredient(&mut tx, *ingredient_id).await?;
    }

    sqlx::query("DELETE FROM output_type_requirements WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE ingredient_rules SET source_category_id = NULL WHERE source_category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE ingredient_rules SET target_category_id = NULL WHERE target_category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM ingredient_categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!(
        "Deleted ingredient category {} ({} ingredients)",
        id,
        ingredient_ids.len()
    );
    Ok(())
}

// ============================================================================
// Ingredients
// ============================================================================

/// Categorised ingredients, by category name, code, then name
///
/// Ingredients without a category are not listed.
pub async fn list_ingredients(pool: &SqlitePool) -> Result<Vec<IngredientListing>> {
    let rows = sqlx::query_as::<_, IngredientListing>(
        r#"
        SELECT i.*, ic.name AS category_name
        FROM ingredients i
        JOIN ingredient_categories ic ON i.category_id = ic.id
        ORDER BY ic.name, i.code, i.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Ingredients of one category, by code then name
pub async fn ingredients_in_category<'e, E>(executor: E, category_id: DbId) -> Result<Vec<Ingredient>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, Ingredient>(
        "SELECT * FROM ingredients WHERE category_id = ? ORDER BY code, name",
    )
    .bind(category_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn create_ingredient(pool: &SqlitePool, input: &IngredientInput) -> Result<DbId> {
    let result = sqlx::query(
        "INSERT INTO ingredients (category_id, code, name, description) VALUES (?, ?, ?, ?)",
    )
    .bind(input.category_id)
    .bind(&input.code)
    .bind(&input.name)
    .bind(&input.description)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_ingredient(pool: &SqlitePool, id: DbId, input: &IngredientInput) -> Result<()> {
    sqlx::query(
        "UPDATE ingredients SET category_id = ?, code = ?, name = ?, description = ? WHERE id = ?",
    )
    .bind(input.category_id)
    .bind(&input.code)
    .bind(&input.name)
    .bind(&input.description)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete an ingredient, its job links and the rules that mention it
pub async fn delete_ingredient(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;
    remove_ingredient(&mut tx, id).await?;
    tx.commit().await?;
    info!("Deleted ingredient {}", id);
    Ok(())
}

async fn remove_ingredient(conn: &mut SqliteConnection, id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM render_job_ingredients WHERE ingredient_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "DELETE FROM ingredient_rules WHERE source_ingredient_id = ? OR target_ingredient_id = ?",
    )
    .bind(id)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    sqlx::query("DELETE FROM ingredients WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ============================================================================
// Rules
// ============================================================================

/// Rules with the names of whatever they point at, by rule type then id
pub async fn list_rules(pool: &SqlitePool) -> Result<Vec<RuleListing>> {
    let rows = sqlx::query_as::<_, RuleListing>(
        r#"
        SELECT r.*,
               si.name AS source_ing_name, sc.name AS source_cat_name,
               ti.name AS target_ing_name, tc.name AS target_cat_name
        FROM ingredient_rules r
        LEFT JOIN ingredients si ON r.source_ingredient_id = si.id
        LEFT JOIN ingredient_categories sc ON r.source_category_id = sc.id
        LEFT JOIN ingredients ti ON r.target_ingredient_id = ti.id
        LEFT JOIN ingredient_categories tc ON r.target_category_id = tc.id
        ORDER BY r.rule_type, r.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn create_rule(pool: &SqlitePool, input: &RuleInput) -> Result<DbId> {
    let result = sqlx::query(
        r#"
        INSERT INTO ingredient_rules (
            rule_type, source_type, source_ingredient_id, source_category_id,
            target_type, target_ingredient_id, target_category_id, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.rule_type)
    .bind(&input.source_type)
    .bind(input.source_ingredient_id)
    .bind(input.source_category_id)
    .bind(&input.target_type)
    .bind(input.target_ingredient_id)
    .bind(input.target_category_id)
    .bind(&input.notes)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn delete_rule(pool: &SqlitePool, id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM ingredient_rules WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
