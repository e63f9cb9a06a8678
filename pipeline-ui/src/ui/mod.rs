//! UI routes - server-rendered HTML pages and their form posts
//!
//! Every page module owns its GET handler and the POST handlers of the forms
//! it renders. Form posts answer with a redirect and queue a flash message
//! for the next page.

use axum::{
    http::{header, HeaderMap},
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};

use crate::AppState;

pub mod layout;

mod archetypes;
mod characters;
mod dashboard;
mod data;
mod dock;
mod ingredients;
mod jobs;
mod media;
mod output_types;
mod projects;
mod prompts;
mod static_assets;
mod top_layer;

/// Drain queued flash messages and wrap `body` in the page shell
pub(crate) async fn render(state: &AppState, title: &str, body: &str) -> Html<String> {
    let flashes = state.flash.drain().await;
    layout::page(title, &flashes, body)
}

/// Redirect to the referring page when the browser sent one
pub(crate) fn redirect_back(headers: &HeaderMap, fallback: &str) -> Redirect {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback);
    Redirect::to(target)
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard_page))
        // Archetypes
        .route("/archetypes", get(archetypes::archetypes_page))
        .route("/archetypes/add", post(archetypes::add_archetype))
        .route("/archetypes/edit/:id", post(archetypes::edit_archetype))
        .route("/archetypes/delete/:id", post(archetypes::delete_archetype))
        .route("/archetypes/set-image/:id", post(archetypes::set_archetype_image))
        // Characters
        .route("/characters", get(characters::characters_page))
        .route("/characters/add", post(characters::add_character))
        .route("/characters/edit/:id", post(characters::edit_character))
        .route("/characters/delete/:id", post(characters::delete_character))
        .route("/characters/set-image/:id", post(characters::set_character_image))
        // Ingredients, categories and rules
        .route("/ingredients", get(ingredients::ingredients_page))
        .route("/ingredients/categories/add", post(ingredients::add_category))
        .route("/ingredients/categories/edit/:id", post(ingredients::edit_category))
        .route("/ingredients/categories/delete/:id", post(ingredients::delete_category))
        .route("/ingredients/add", post(ingredients::add_ingredient))
        .route("/ingredients/edit/:id", post(ingredients::edit_ingredient))
        .route("/ingredients/delete/:id", post(ingredients::delete_ingredient))
        .route("/ingredients/rules/add", post(ingredients::add_rule))
        .route("/ingredients/rules/delete/:id", post(ingredients::delete_rule))
        // Output types
        .route("/output-types", get(output_types::output_types_page))
        .route("/output-types/add", post(output_types::add_output_type))
        .route("/output-types/edit/:id", post(output_types::edit_output_type))
        .route("/output-types/delete/:id", post(output_types::delete_output_type))
        .route("/output-types/add-requirement", post(output_types::add_requirement))
        .route("/output-types/delete-requirement/:id", post(output_types::delete_requirement))
        // Render jobs
        .route(
            "/jobs/builder",
            get(jobs::builder_page).post(jobs::create_from_builder),
        )
        .route("/jobs", get(jobs::jobs_page))
        .route("/jobs/add", post(jobs::add_job))
        .route("/jobs/edit/:id", post(jobs::edit_job))
        .route("/jobs/update-status/:id", post(jobs::update_job_status))
        .route("/jobs/delete/:id", post(jobs::delete_job))
        // Media
        .route("/media", get(media::media_page))
        .route("/media/add", post(media::add_media))
        .route("/media/edit/:id", post(media::edit_media))
        .route("/media/update-status/:id", post(media::update_media_status))
        .route("/media/delete/:id", post(media::delete_media))
        // Top layer
        .route("/top-layer", get(top_layer::top_layer_page))
        .route("/top-layer/add", post(top_layer::add_clip))
        .route("/top-layer/edit/:id", post(top_layer::edit_clip))
        .route("/top-layer/delete/:id", post(top_layer::delete_clip))
        .route("/top-layer/link-job/:id", post(top_layer::link_job))
        .route("/top-layer/unlink-job/:id", post(top_layer::unlink_job))
        // Projects and journal
        .route("/projects", get(projects::projects_page))
        .route("/projects/add", post(projects::add_project))
        .route("/projects/edit/:id", post(projects::edit_project))
        .route("/projects/delete/:id", post(projects::delete_project))
        .route("/projects/:id/link-job", post(projects::link_job))
        .route("/projects/:id/unlink-job/:link_id", post(projects::unlink_job))
        .route("/journal", get(projects::journal_page))
        // Prompts
        .route("/prompts/add", post(prompts::add_prompt))
        .route("/prompts/edit/:id", post(prompts::edit_prompt))
        .route("/prompts/delete/:id", post(prompts::delete_prompt))
        .route("/prompt-library", get(prompts::prompt_library_page))
        // Dock
        .route("/dock", get(dock::dock_page))
        .route("/dock/config", post(dock::save_dock_config))
        // Data management
        .route("/data", get(data::data_page))
        // Static assets
        .route("/static/pipeline.css", get(static_assets::serve_pipeline_css))
        .route("/static/pipeline.js", get(static_assets::serve_pipeline_js))
}
