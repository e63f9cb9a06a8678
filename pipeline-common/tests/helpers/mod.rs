//! Shared fixtures for pipeline-common integration tests

#![allow(dead_code)]

use pipeline_common::db::{self, characters, ingredients, jobs, media, output_types};
use pipeline_common::models::*;
use sqlx::SqlitePool;

/// Fresh in-memory database with the full schema
pub async fn memory_db() -> SqlitePool {
    db::init_memory_database()
        .await
        .expect("Failed to create in-memory database")
}

/// Ids of the seeded catalogue
pub struct Seed {
    pub nova: DbId,
    pub atlas: DbId,
    pub retired: DbId,
    pub wardrobe: DbId,
    pub lighting: DbId,
    pub props: DbId,
    pub red_cape: DbId,
    pub blue_coat: DbId,
    pub dusk: DbId,
    pub portrait: DbId,
    pub banner: DbId,
    pub sketch: DbId,
    pub job_rendered: DbId,
    pub job_planned: DbId,
    pub job_complete: DbId,
}

pub fn character(name: &str, status: CharacterStatus, tags: &str) -> CharacterInput {
    CharacterInput {
        name: name.to_string(),
        archetype_id: None,
        description: String::new(),
        visual_notes: String::new(),
        status,
        tags: tags.to_string(),
        image_path: String::new(),
    }
}

pub fn category(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        description: String::new(),
    }
}

pub fn ingredient(category_id: DbId, code: &str, name: &str) -> IngredientInput {
    IngredientInput {
        category_id: Some(category_id),
        code: code.to_string(),
        name: name.to_string(),
        description: String::new(),
    }
}

pub fn output_type(name: &str) -> OutputTypeInput {
    OutputTypeInput {
        name: name.to_string(),
        description: String::new(),
    }
}

pub fn job(character_id: DbId, output_type_id: DbId, status: JobStatus) -> JobInput {
    JobInput {
        character_id: Some(character_id),
        output_type_id: Some(output_type_id),
        status,
        notes: String::new(),
    }
}

pub fn annotated_media(job_id: Option<DbId>, character_id: Option<DbId>) -> MediaInput {
    MediaInput {
        job_id,
        character_id,
        output_type_id: None,
        file_path: "renders/out.png".to_string(),
        title: "Title".to_string(),
        description: "Description".to_string(),
        tags: "red, bold".to_string(),
        seo_title: "SEO title".to_string(),
        seo_description: "SEO description".to_string(),
        quality_status: QualityStatus::Unreviewed,
        notes: String::new(),
        prompt: String::new(),
    }
}

/// Catalogue used across tests
///
/// - characters: Nova (active), Atlas (concept), Old Timer (retired)
/// - Wardrobe: Red Cape, Blue Coat; Lighting: Dusk Lighting; Props: empty
/// - Portrait requires Wardrobe and Lighting, Banner requires Props,
///   Sketch requires nothing
/// - jobs: Nova Portrait (rendered, Red Cape + Dusk Lighting),
///   Atlas Portrait (planned), Nova Banner (complete)
pub async fn seed(pool: &SqlitePool) -> Seed {
    let nova = characters::create_character(pool, &character("Nova", CharacterStatus::Active, "hero"))
        .await
        .unwrap();
    let atlas = characters::create_character(pool, &character("Atlas", CharacterStatus::Concept, ""))
        .await
        .unwrap();
    let retired =
        characters::create_character(pool, &character("Old Timer", CharacterStatus::Retired, ""))
            .await
            .unwrap();

    let wardrobe = ingredients::create_category(pool, &category("Wardrobe")).await.unwrap();
    let lighting = ingredients::create_category(pool, &category("Lighting")).await.unwrap();
    let props = ingredients::create_category(pool, &category("Props")).await.unwrap();

    let red_cape = ingredients::create_ingredient(pool, &ingredient(wardrobe, "W1", "Red Cape"))
        .await
        .unwrap();
    let blue_coat = ingredients::create_ingredient(pool, &ingredient(wardrobe, "W2", "Blue Coat"))
        .await
        .unwrap();
    let dusk = ingredients::create_ingredient(pool, &ingredient(lighting, "L1", "Dusk Lighting"))
        .await
        .unwrap();

    let portrait = output_types::create_output_type(pool, &output_type("Portrait")).await.unwrap();
    let banner = output_types::create_output_type(pool, &output_type("Banner")).await.unwrap();
    let sketch = output_types::create_output_type(pool, &output_type("Sketch")).await.unwrap();
    output_types::add_requirement(pool, portrait, wardrobe).await.unwrap();
    output_types::add_requirement(pool, portrait, lighting).await.unwrap();
    output_types::add_requirement(pool, banner, props).await.unwrap();

    let job_rendered = jobs::create_job_with_ingredients(
        pool,
        &job(nova, portrait, JobStatus::Rendered),
        &[red_cape, dusk],
    )
    .await
    .unwrap();
    let job_planned = jobs::create_job(pool, &job(atlas, portrait, JobStatus::Planned))
        .await
        .unwrap();
    let job_complete = jobs::create_job(pool, &job(nova, banner, JobStatus::Complete))
        .await
        .unwrap();

    Seed {
        nova,
        atlas,
        retired,
        wardrobe,
        lighting,
        props,
        red_cape,
        blue_coat,
        dusk,
        portrait,
        banner,
        sketch,
        job_rendered,
        job_planned,
        job_complete,
    }
}

/// Row count of one table
pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn add_media(pool: &SqlitePool, input: &MediaInput) -> DbId {
    media::create_media(pool, input).await.unwrap()
}
