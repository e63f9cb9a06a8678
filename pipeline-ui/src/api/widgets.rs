//! JSON lookups behind the page widgets

use axum::{
    extract::{Path, Query, State},
    Json,
};
use pipeline_common::aggregate::{aggregate_clip_meta, ClipMeta};
use pipeline_common::combo::{pick_combo, Combo, ComboLocks, ThreadRngChooser};
use pipeline_common::db;
use pipeline_common::derive::derive_for_job;
use pipeline_common::models::{DbId, Ingredient, IngredientCategory, JobDetail, JobIngredient};
use serde::Serialize;

use crate::{AppState, ApiError, ApiResult};

fn parse_id(name: &str, value: &str) -> ApiResult<DbId> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, value)))
}

/// Locks from `char_id`, `ot_id` and repeated `ing_id` parameters; empty values are ignored
fn combo_locks(params: &[(String, String)]) -> ApiResult<ComboLocks> {
    let mut locks = ComboLocks::default();
    for (key, value) in params.iter().filter(|(_, v)| !v.trim().is_empty()) {
        match key.as_str() {
            "char_id" => locks.character_id = Some(parse_id(key, value)?),
            "ot_id" => locks.output_type_id = Some(parse_id(key, value)?),
            "ing_id" => locks.ingredient_ids.push(parse_id(key, value)?),
            _ => {}
        }
    }
    Ok(locks)
}

/// GET /api/random-combo?char_id=&ot_id=&ing_id=...
pub async fn random_combo(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Combo>> {
    let locks = combo_locks(&params)?;
    let combo = pick_combo(&state.db, &locks, &mut ThreadRngChooser).await?;
    Ok(Json(combo))
}

/// Job lookup used to prefill media forms
#[derive(Debug, Serialize)]
pub struct JobData {
    pub job: JobDetail,
    pub ingredients: Vec<JobIngredient>,
    pub auto_title: String,
    pub auto_tags: String,
    pub character_id: Option<DbId>,
    pub output_type_id: Option<DbId>,
}

/// GET /api/job-data/:id
pub async fn job_data(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<JobData>> {
    let job = db::jobs::get_job_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;
    let ingredients = db::jobs::job_ingredients(&state.db, id).await?;
    let meta = derive_for_job(&job, &ingredients);

    Ok(Json(JobData {
        character_id: job.job.character_id,
        output_type_id: job.job.output_type_id,
        job,
        ingredients,
        auto_title: meta.title,
        auto_tags: meta.tags,
    }))
}

/// A required category with its ingredients
#[derive(Debug, Serialize)]
pub struct Requirement {
    pub category: IngredientCategory,
    pub ingredients: Vec<Ingredient>,
}

/// GET /api/output-type-requirements/:id
///
/// An unknown output type has no requirements and yields an empty list.
pub async fn output_type_requirements(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<Vec<Requirement>>> {
    let mut result = Vec::new();
    for category in db::output_types::required_categories(&state.db, id).await? {
        let ingredients = db::ingredients::ingredients_in_category(&state.db, category.id).await?;
        result.push(Requirement {
            category,
            ingredients,
        });
    }
    Ok(Json(result))
}

/// GET /api/top-layer-meta/:id
pub async fn top_layer_meta(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<ClipMeta>> {
    let media = db::top_layer::linked_media(&state.db, id).await?;
    Ok(Json(aggregate_clip_meta(&media)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_combo_locks_collects_repeated_ingredients() {
        let locks = combo_locks(&params(&[
            ("char_id", "3"),
            ("ot_id", ""),
            ("ing_id", "7"),
            ("ing_id", "9"),
        ]))
        .unwrap();

        assert_eq!(locks.character_id, Some(3));
        assert_eq!(locks.output_type_id, None);
        assert_eq!(locks.ingredient_ids, vec![7, 9]);
    }

    #[test]
    fn test_combo_locks_rejects_bad_id() {
        let err = combo_locks(&params(&[("char_id", "abc")])).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
