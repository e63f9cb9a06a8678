//! JSON endpoint, upload and export/import tests driven through the router

mod common;

use axum::http::{header, StatusCode};
use base64::prelude::*;
use common::{seed, test_app};
use pipeline_common::db;
use pipeline_common::models::{JobStatus, PromptInput, PromptStatus};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_module() {
    let app = test_app().await;
    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pipeline-ui");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_buildinfo_fields() {
    let app = test_app().await;
    let body = app.get("/api/buildinfo").await.json();

    for key in ["version", "git_hash", "build_timestamp", "build_profile"] {
        assert!(body[key].is_string(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_job_data_derives_title_and_tags() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let response = app.get(&format!("/api/job-data/{}", seed.job)).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["auto_title"], "Nova — Dusk Lighting, Red Cape");
    assert_eq!(body["auto_tags"], "nova,hero,dusk lighting,red cape");
    assert_eq!(body["character_id"], seed.nova);
    assert_eq!(body["output_type_id"], seed.portrait);
    assert_eq!(body["job"]["character_name"], "Nova");
    assert_eq!(body["ingredients"][0]["category_name"], "Lighting");
}

#[tokio::test]
async fn test_job_data_unknown_job_is_404() {
    let app = test_app().await;
    let response = app.get("/api/job-data/999").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_output_type_requirements_by_category_name() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let body = app
        .get(&format!("/api/output-type-requirements/{}", seed.portrait))
        .await
        .json();
    let reqs = body.as_array().unwrap();

    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0]["category"]["name"], "Lighting");
    assert_eq!(reqs[1]["category"]["name"], "Wardrobe");
    assert_eq!(reqs[1]["ingredients"][0]["name"], "Red Cape");
}

#[tokio::test]
async fn test_random_combo_honours_locks() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let uri = format!(
        "/api/random-combo?char_id={}&ot_id={}&ing_id={}",
        seed.nova, seed.portrait, seed.red_cape
    );
    let body = app.get(&uri).await.json();

    assert_eq!(body["character"]["id"], seed.nova);
    assert_eq!(body["output_type"]["id"], seed.portrait);
    let picks = body["ingredients"].as_array().unwrap();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0]["category"]["id"], seed.lighting);
    assert_eq!(picks[0]["ingredient"]["id"], seed.dusk);
    assert_eq!(picks[1]["category"]["id"], seed.wardrobe);
    assert_eq!(picks[1]["ingredient"]["id"], seed.red_cape);
}

#[tokio::test]
async fn test_random_combo_empty_database() {
    let app = test_app().await;
    let body = app.get("/api/random-combo").await.json();

    assert_eq!(
        body,
        json!({ "character": null, "output_type": null, "ingredients": [] })
    );
}

#[tokio::test]
async fn test_random_combo_rejects_bad_id() {
    let app = test_app().await;
    let response = app.get("/api/random-combo?char_id=nova").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_top_layer_meta_aggregates_linked_media() {
    let app = test_app().await;
    let seed = seed(&app).await;
    let pool = &app.state.db;

    sqlx::query(
        "INSERT INTO media_assets (job_id, character_id, tags, description, seo_description) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(seed.job)
    .bind(seed.nova)
    .bind("red, bold")
    .bind("First cut")
    .bind("Nova at dusk")
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO media_assets (job_id, tags, description) VALUES (?, ?, ?)",
    )
    .bind(seed.job)
    .bind("bold, retro")
    .bind("First cut")
    .execute(pool)
    .await
    .unwrap();

    let clip: i64 = sqlx::query("INSERT INTO top_layer_media (title) VALUES ('Reel')")
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();
    db::top_layer::link_job(pool, clip, seed.job).await.unwrap();

    let body = app.get(&format!("/api/top-layer-meta/{}", clip)).await.json();
    assert_eq!(body["tags"], "bold, red, retro");
    assert_eq!(body["characters"], "Nova");
    assert_eq!(body["description"], "First cut");
    assert_eq!(body["seo_description"], "Nova at dusk");
}

#[tokio::test]
async fn test_prompt_status_allow_list() {
    let app = test_app().await;
    let id = db::prompts::create_prompt(
        &app.state.db,
        &PromptInput {
            project_id: None,
            job_id: None,
            text: "wide shot".into(),
            label: "A".into(),
            notes: String::new(),
        },
    )
    .await
    .unwrap();
    let uri = format!("/api/prompts/status/{}", id);

    let response = app.post_json(&uri, json!({ "status": "archived" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post_json(&uri, json!({ "status": "collected" })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "ok": true }));

    let prompt = db::prompts::get_prompt(&app.state.db, id).await.unwrap().unwrap();
    assert_eq!(prompt.status, PromptStatus::Collected);
}

#[tokio::test]
async fn test_dock_submit_media_completes_job() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let response = app
        .post_form(
            "/api/dock/submit-media",
            &format!("job_id={}&file_path=renders%2Fnova.png", seed.job),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["title"], "Nova — Dusk Lighting, Red Cape");

    let job = db::jobs::get_job(&app.state.db, seed.job).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Complete);

    let media = db::media::list_media(&app.state.db, None, None).await.unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].media.id, body["media_id"].as_i64().unwrap());
    assert_eq!(media[0].media.file_path, "renders/nova.png");
    assert_eq!(media[0].media.tags, "nova,hero,dusk lighting,red cape");
}

#[tokio::test]
async fn test_dock_jobs_lists_active_only() {
    let app = test_app().await;
    let seed = seed(&app).await;

    let body = app.get("/api/dock/jobs").await.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], seed.job);

    db::jobs::update_job_status(&app.state.db, seed.job, JobStatus::Complete)
        .await
        .unwrap();
    let body = app.get("/api/dock/jobs?project_id=").await.json();
    assert!(body.as_array().unwrap().is_empty());

    let config = app.get("/api/dock/config").await.json();
    assert_eq!(config.as_array().unwrap().len(), 5);
    assert_eq!(config[0]["label"], "Job Builder");
}

#[tokio::test]
async fn test_upload_pasted_image() {
    let app = test_app().await;
    let data = format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(b"fake-jpeg"));

    let response = app
        .post_json("/upload-image", json!({ "image_b64": data, "mime": "image/jpeg" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    let filename = body["filename"].as_str().unwrap();
    assert!(filename.ends_with(".jpg"));
    assert_eq!(filename.len(), 32 + 4);
    assert_eq!(body["url"], format!("/static/images/{}", filename));

    let saved = std::fs::read(app.images.path().join(filename)).unwrap();
    assert_eq!(saved, b"fake-jpeg");

    let served = app.get(&format!("/static/images/{}", filename)).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.body, b"fake-jpeg");
}

#[tokio::test]
async fn test_upload_dropped_file() {
    let app = test_app().await;

    let response = app.post_file("/upload-image", "image", "shot.WEBP", b"webp").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["filename"].as_str().unwrap().ends_with(".webp"));

    let response = app.post_file("/upload-image", "image", "notes.txt", b"text").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({ "error": "Unsupported format" }));
}

#[tokio::test]
async fn test_upload_without_image() {
    let app = test_app().await;

    let response = app.post_json("/upload-image", json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({ "error": "No image received" }));

    let response = app.post_file("/upload-image", "other", "a.png", b"png").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post_json("/upload-image", json!({ "image_b64": "***not base64***" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_then_import_into_empty_database() {
    let source = test_app().await;
    seed(&source).await;

    let export = source.get("/export").await;
    assert_eq!(export.status, StatusCode::OK);
    let disposition = export.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"pipeline_export_"));
    assert!(disposition.ends_with(".json\""));

    let document = export.json();
    assert_eq!(document["version"], "0.2");
    assert!(document["tables"].get("schema_version").is_none());
    assert_eq!(document["tables"]["dock_config"].as_array().unwrap().len(), 5);

    // characters 1, categories 2, ingredients 2, output types 1,
    // requirements 2, jobs 1, job ingredients 2
    let target = test_app().await;
    let response = target
        .post_file("/import", "file", "backup.json", &export.body)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/data");
    let page = target.get("/data").await.text();
    assert!(page.contains("Import complete: 11 records added, 0 skipped (already existed)."));

    let response = target
        .post_file("/import", "file", "backup.json", &export.body)
        .await;
    assert_eq!(response.location(), "/data");
    let page = target.get("/data").await.text();
    assert!(page.contains("Import complete: 0 records added, 11 skipped (already existed)."));
}

#[tokio::test]
async fn test_import_rejections_flash() {
    let app = test_app().await;

    app.post_file("/import", "file", "backup.csv", b"{}").await;
    assert!(app
        .get("/data")
        .await
        .text()
        .contains("Please upload a .json export file."));

    app.post_file("/import", "file", "backup.json", b"{oops").await;
    assert!(app.get("/data").await.text().contains("Could not parse file: "));

    app.post_file("/import", "other", "backup.json", b"{}").await;
    assert!(app.get("/data").await.text().contains("No file selected."));
}
