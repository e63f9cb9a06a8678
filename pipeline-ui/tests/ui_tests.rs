//! Page rendering and form flow tests

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{seed, test_app};
use pipeline_common::db;
use pipeline_common::models::{JobStatus, ProjectInput, ProjectStatus};

const PAGES: &[&str] = &[
    "/",
    "/archetypes",
    "/characters",
    "/ingredients",
    "/output-types",
    "/jobs",
    "/jobs/builder",
    "/media",
    "/top-layer",
    "/projects",
    "/journal",
    "/prompt-library",
    "/dock",
    "/data",
];

#[tokio::test]
async fn test_every_page_renders_empty() {
    let app = test_app().await;
    for uri in PAGES {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "GET {}", uri);
        assert!(response.text().contains("<html"), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_every_page_renders_seeded() {
    let app = test_app().await;
    seed(&app).await;
    for uri in PAGES {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "GET {}", uri);
    }

    let jobs = app.get("/jobs").await.text();
    assert!(jobs.contains("Red Cape"));
    assert!(jobs.contains("Nova"));
}

#[tokio::test]
async fn test_static_assets_content_type() {
    let app = test_app().await;

    let css = app.get("/static/pipeline.css").await;
    assert_eq!(css.status, StatusCode::OK);
    assert!(css.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/css"));

    let js = app.get("/static/pipeline.js").await;
    assert!(js.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .contains("javascript"));
}

#[tokio::test]
async fn test_duplicate_category_flash() {
    let app = test_app().await;

    let response = app
        .post_form("/ingredients/categories/add", "name=Wardrobe&description=")
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/ingredients");
    assert!(app.get("/ingredients").await.text().contains("Category added."));

    app.post_form("/ingredients/categories/add", "name=Wardrobe").await;
    let page = app.get("/ingredients").await.text();
    assert!(page.contains("Name already exists."));

    // Flash messages are shown once
    assert!(!app.get("/ingredients").await.text().contains("Name already exists."));

    let categories = db::ingredients::list_categories_by_name(&app.state.db).await.unwrap();
    assert_eq!(categories.len(), 1);
}

#[tokio::test]
async fn test_rename_category_to_taken_name() {
    let app = test_app().await;
    let seed = seed(&app).await;

    app.post_form(
        &format!("/ingredients/categories/edit/{}", seed.lighting),
        "name=Wardrobe",
    )
    .await;
    assert!(app.get("/ingredients").await.text().contains("Name already taken."));
}

#[tokio::test]
async fn test_builder_creates_job_with_ingredients() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let form = format!(
        "character_id={}&output_type_id={}&status=planned&notes=&ingredient_ids={}&ingredient_ids={}&ingredient_ids=",
        seed.nova, seed.portrait, seed.red_cape, seed.dusk
    );
    let response = app.post_form("/jobs/builder", &form).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/jobs");

    let new_job = seed.job + 1;
    let page = app.get("/jobs").await.text();
    assert!(page.contains(&format!("Render job #{} created from builder.", new_job)));

    let job = db::jobs::get_job(&app.state.db, new_job).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Planned);
    let ingredients = db::jobs::job_ingredients(&app.state.db, new_job).await.unwrap();
    let names: Vec<&str> = ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Dusk Lighting", "Red Cape"]);
}

#[tokio::test]
async fn test_builder_rejects_unknown_status() {
    let app = test_app().await;
    let response = app.post_form("/jobs/builder", "status=shipped").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_job_status_redirects_to_referer() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri(format!("/jobs/update-status/{}", seed.job))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::REFERER, "/jobs?status=rendered")
                .body(Body::from("status=complete"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.location(), "/jobs?status=rendered");

    let job = db::jobs::get_job(&app.state.db, seed.job).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Complete);

    let response = app
        .post_form(&format!("/jobs/update-status/{}", seed.job), "status=planned")
        .await;
    assert_eq!(response.location(), "/jobs");
}

#[tokio::test]
async fn test_delete_character_keeps_jobs() {
    let app = test_app().await;
    let seed = seed(&app).await;

    app.post_form(&format!("/characters/delete/{}", seed.nova), "").await;
    assert!(app.get("/characters").await.text().contains("Character deleted."));

    let job = db::jobs::get_job(&app.state.db, seed.job).await.unwrap().unwrap();
    assert_eq!(job.character_id, None);
}

#[tokio::test]
async fn test_journal_links_job_once() {
    let app = test_app().await;
    let seed = seed(&app).await;
    let project = db::projects::create_project(
        &app.state.db,
        &ProjectInput {
            name: "Launch".into(),
            description: String::new(),
            status: ProjectStatus::Active,
            notes: String::new(),
        },
    )
    .await
    .unwrap();

    let uri = format!("/projects/{}/link-job", project);
    let body = format!("job_id={}", seed.job);
    let response = app.post_form(&uri, &body).await;
    assert_eq!(response.location(), format!("/journal?project_id={}", project));
    app.post_form(&uri, &body).await;

    let links = db::projects::linked_jobs(&app.state.db, project).await.unwrap();
    assert_eq!(links.len(), 1);

    let page = app
        .get(&format!("/journal?project_id={}", project))
        .await
        .text();
    assert!(page.contains("Launch"));
    assert!(page.contains("Nova"));
}

#[tokio::test]
async fn test_journal_prompt_round_trip() {
    let app = test_app().await;
    let project = db::projects::create_project(
        &app.state.db,
        &ProjectInput {
            name: "Launch".into(),
            description: String::new(),
            status: ProjectStatus::Active,
            notes: String::new(),
        },
    )
    .await
    .unwrap();

    let response = app
        .post_form(
            "/prompts/add",
            &format!("project_id={}&label=Hero+shot&text=low+angle&notes=", project),
        )
        .await;
    assert_eq!(response.location(), format!("/journal?project_id={}", project));

    let library = app.get("/prompt-library").await.text();
    assert!(library.contains("low angle"));

    let response = app.post_form("/prompts/add", "label=Loose&text=free+floating").await;
    assert_eq!(response.location(), "/prompt-library");
}

#[tokio::test]
async fn test_save_dock_config() {
    let app = test_app().await;

    let response = app
        .post_form(
            "/dock/config",
            "label_1=Builder&url_1=%2Fjobs%2Fbuilder&label_2=Media&url_2=%2Fmedia",
        )
        .await;
    assert_eq!(response.location(), "/dock");
    assert!(app.get("/dock").await.text().contains("Dock configuration saved."));

    let slots = db::dock::list_slots(&app.state.db).await.unwrap();
    assert_eq!(slots.len(), 5);
    assert_eq!(slots[0].label, "Builder");
    assert_eq!(slots[1].url, "/media");
    assert_eq!(slots[4].label, "");
}

#[tokio::test]
async fn test_media_page_offers_rendered_jobs() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let page = app.get("/media").await.text();
    assert!(page.contains(&format!("data-job-id=\"{}\"", seed.job)));

    let response = app
        .post_form(
            "/media/add",
            &format!(
                "job_id={}&character_id={}&output_type_id={}&title=Nova&file_path=a.png",
                seed.job, seed.nova, seed.portrait
            ),
        )
        .await;
    assert_eq!(response.location(), "/media");
    let page = app.get("/media").await.text();
    assert!(page.contains("Media asset imported."));
    assert!(!page.contains(&format!("data-job-id=\"{}\"", seed.job)));
}

#[tokio::test]
async fn test_data_page_lists_import_limits() {
    let app = test_app().await;
    let page = app.get("/data").await.text();

    assert!(page.contains("Projects, prompts and dock settings are not imported."));
    assert!(page.contains("a row with a null text value (older exports) is counted as skipped"));
}

#[tokio::test]
async fn test_media_page_links_pending_jobs() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let page = app.get("/media").await.text();
    assert!(page.contains(&format!(
        r##"<a href="#" class="use-job" data-job-id="{}">"##,
        seed.job
    )));
}
