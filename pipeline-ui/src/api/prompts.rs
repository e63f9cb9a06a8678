//! Prompt status endpoint used by the journal and prompt library

use axum::{
    extract::{Path, State},
    Json,
};
use pipeline_common::db;
use pipeline_common::models::{DbId, PromptStatus};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{AppState, ApiResult};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: String,
}

/// POST /api/prompts/status/:id
///
/// The status must be one of the prompt statuses; anything else is a 400.
pub async fn update_prompt_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Value>> {
    let status: PromptStatus = body.status.parse()?;
    db::prompts::update_prompt_status(&state.db, id, status).await?;
    Ok(Json(json!({ "ok": true })))
}
