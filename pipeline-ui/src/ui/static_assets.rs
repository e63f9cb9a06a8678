//! Static asset handlers
//!
//! Embeds and serves CSS/JS files at compile time

use axum::{http::StatusCode, response::{IntoResponse, Response}};

const PIPELINE_CSS: &str = include_str!("../../static/pipeline.css");
const PIPELINE_JS: &str = include_str!("../../static/pipeline.js");

/// GET /static/pipeline.css
pub async fn serve_pipeline_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        PIPELINE_CSS,
    )
        .into_response()
}

/// GET /static/pipeline.js
///
/// Widgets: combo picker, builder requirement loader, job-data autofill,
/// clip metadata suggestions, image paste/drop upload, prompt status and
/// dock media submission.
pub async fn serve_pipeline_js() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "application/javascript"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        PIPELINE_JS,
    )
        .into_response()
}
