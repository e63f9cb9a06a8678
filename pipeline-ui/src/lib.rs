//! pipeline-ui library - render pipeline tracker web interface
//!
//! Server-rendered HTML pages for catalogue, job, media and project
//! management plus the JSON endpoints used by page widgets.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod flash;
pub mod ui;

pub use error::{ApiError, ApiResult};
use flash::FlashQueue;

/// URL prefix uploaded images are served under
pub const IMAGES_URL_PREFIX: &str = "/static/images";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory uploaded images are written to
    pub images_dir: PathBuf,
    /// Messages shown on the next rendered page
    pub flash: FlashQueue,
    /// Server start time, reported as uptime by /health
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, images_dir: PathBuf) -> Self {
        Self {
            db,
            images_dir,
            flash: FlashQueue::default(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let images = ServeDir::new(&state.images_dir);

    Router::new()
        .merge(ui::ui_routes())
        .merge(api::api_routes())
        .merge(api::health_routes())
        .nest_service(IMAGES_URL_PREFIX, images)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
