//! Dock endpoints: shortcut config, active jobs, job prompts, quick media submission

use axum::{
    extract::{Path, Query, State},
    Form, Json,
};
use pipeline_common::db;
use pipeline_common::models::{empty_as_none, DbId, DockSlot, JobListing, Prompt};
use serde::{Deserialize, Serialize};

use crate::{AppState, ApiResult};

/// GET /api/dock/config
pub async fn dock_config(State(state): State<AppState>) -> ApiResult<Json<Vec<DockSlot>>> {
    Ok(Json(db::dock::list_slots(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct DockJobsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub project_id: Option<DbId>,
}

/// GET /api/dock/jobs?project_id=
///
/// Newest 20 planned, in-progress or rendered jobs, optionally only those
/// linked to the project.
pub async fn dock_jobs(
    State(state): State<AppState>,
    Query(query): Query<DockJobsQuery>,
) -> ApiResult<Json<Vec<JobListing>>> {
    Ok(Json(db::jobs::active_jobs(&state.db, query.project_id).await?))
}

/// GET /api/dock/job-prompts/:job_id
pub async fn job_prompts(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> ApiResult<Json<Vec<Prompt>>> {
    Ok(Json(db::prompts::job_prompts(&state.db, job_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SubmitMediaForm {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub job_id: Option<DbId>,
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitMediaResponse {
    pub ok: bool,
    pub media_id: DbId,
    pub title: String,
}

/// POST /api/dock/submit-media
pub async fn submit_media(
    State(state): State<AppState>,
    Form(form): Form<SubmitMediaForm>,
) -> ApiResult<Json<SubmitMediaResponse>> {
    let submitted = db::media::submit_media(&state.db, form.job_id, &form.file_path).await?;
    Ok(Json(SubmitMediaResponse {
        ok: true,
        media_id: submitted.media_id,
        title: submitted.title,
    }))
}
