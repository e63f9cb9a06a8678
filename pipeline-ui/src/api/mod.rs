//! JSON endpoints, image upload and export/import
//!
//! Page widgets call the `/api/*` routes; `/upload-image`, `/export` and
//! `/import` sit at the top level beside the pages that use them.

pub mod buildinfo;
pub mod dock;
pub mod health;
pub mod prompts;
pub mod transfer;
pub mod upload;
pub mod widgets;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use health::health_routes;

/// Largest accepted upload (images and export files)
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Widgets
        .route("/api/random-combo", get(widgets::random_combo))
        .route("/api/job-data/:id", get(widgets::job_data))
        .route(
            "/api/output-type-requirements/:id",
            get(widgets::output_type_requirements),
        )
        .route("/api/top-layer-meta/:id", get(widgets::top_layer_meta))
        // Prompts
        .route("/api/prompts/status/:id", post(prompts::update_prompt_status))
        // Dock
        .route("/api/dock/config", get(dock::dock_config))
        .route("/api/dock/jobs", get(dock::dock_jobs))
        .route("/api/dock/job-prompts/:job_id", get(dock::job_prompts))
        .route("/api/dock/submit-media", post(dock::submit_media))
        // Build identification
        .route("/api/buildinfo", get(buildinfo::get_build_info))
        // Uploads and data transfer
        .route("/upload-image", post(upload::upload_image))
        .route("/export", get(transfer::export_data))
        .route("/import", post(transfer::import_data))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
