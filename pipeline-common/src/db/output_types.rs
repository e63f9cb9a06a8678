//! Output types and their required ingredient categories

use crate::models::{DbId, IngredientCategory, OutputType, OutputTypeInput, RequirementListing};
use crate::Result;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

pub async fn list_output_types(pool: &SqlitePool) -> Result<Vec<OutputType>> {
    let rows = sqlx::query_as::<_, OutputType>("SELECT * FROM output_types ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get_output_type<'e, E>(executor: E, id: DbId) -> Result<Option<OutputType>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, OutputType>("SELECT * FROM output_types WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

pub async fn create_output_type(pool: &SqlitePool, input: &OutputTypeInput) -> Result<DbId> {
    let result = sqlx::query("INSERT INTO output_types (name, description) VALUES (?, ?)")
        .bind(&input.name)
        .bind(&input.description)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_output_type(pool: &SqlitePool, id: DbId, input: &OutputTypeInput) -> Result<()> {
    sqlx::query("UPDATE output_types SET name = ?, description = ? WHERE id = ?")
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an output type and its requirements; jobs and media keep their rows
pub async fn delete_output_type(pool: &SqlitePool, id: DbId) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM output_type_requirements WHERE output_type_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE render_jobs SET output_type_id = NULL WHERE output_type_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE media_assets SET output_type_id = NULL WHERE output_type_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM output_types WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Deleted output type {}", id);
    Ok(())
}

/// Every requirement with output type and category names
pub async fn list_requirements(pool: &SqlitePool) -> Result<Vec<RequirementListing>> {
    let rows = sqlx::query_as::<_, RequirementListing>(
        r#"
        SELECT otr.id, otr.output_type_id, otr.category_id,
               ot.name AS output_name, ic.name AS category_name
        FROM output_type_requirements otr
        JOIN output_types ot ON otr.output_type_id = ot.id
        JOIN ingredient_categories ic ON otr.category_id = ic.id
        ORDER BY ot.name, ic.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Categories an output type requires, by category name
pub async fn required_categories<'e, E>(
    executor: E,
    output_type_id: DbId,
) -> Result<Vec<IngredientCategory>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, IngredientCategory>(
        r#"
        SELECT ic.*
        FROM output_type_requirements otr
        JOIN ingredient_categories ic ON otr.category_id = ic.id
        WHERE otr.output_type_id = ?
        ORDER BY ic.name
        "#,
    )
    .bind(output_type_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn add_requirement(pool: &SqlitePool, output_type_id: DbId, category_id: DbId) -> Result<DbId> {
    let result = sqlx::query(
        "INSERT INTO output_type_requirements (output_type_id, category_id) VALUES (?, ?)",
    )
    .bind(output_type_id)
    .bind(category_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_requirement(pool: &SqlitePool, id: DbId) -> Result<()> {
    sqlx::query("DELETE FROM output_type_requirements WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
