//! Export/import behaviour against in-memory databases

mod helpers;

use helpers::*;
use pipeline_common::db::{self, jobs, projects, prompts, top_layer};
use pipeline_common::models::*;
use pipeline_common::transfer::{
    export_database, export_tables, import_database, EXPORT_VERSION, IMPORT_ORDER,
};
use serde_json::json;

async fn populated() -> sqlx::SqlitePool {
    let pool = memory_db().await;
    let s = seed(&pool).await;
    add_media(&pool, &annotated_media(Some(s.job_rendered), Some(s.nova))).await;

    let clip = top_layer::create_clip(
        &pool,
        &TopLayerInput {
            title: "Compilation".into(),
            file_path: String::new(),
            description: String::new(),
            tags: String::new(),
            seo_title: String::new(),
            seo_description: String::new(),
            notes: String::new(),
        },
    )
    .await
    .unwrap();
    top_layer::link_job(&pool, clip, s.job_rendered).await.unwrap();

    let project = projects::create_project(
        &pool,
        &ProjectInput {
            name: "Launch".into(),
            description: String::new(),
            status: ProjectStatus::Active,
            notes: String::new(),
        },
    )
    .await
    .unwrap();
    prompts::create_prompt(
        &pool,
        &PromptInput {
            project_id: Some(project),
            job_id: None,
            text: "a hero at dusk".into(),
            label: String::new(),
            notes: String::new(),
        },
    )
    .await
    .unwrap();

    pool
}

#[tokio::test]
async fn test_export_envelope_and_tables() {
    let pool = populated().await;
    let doc = export_database(&pool).await.unwrap();

    assert_eq!(doc.version, EXPORT_VERSION);
    assert!(!doc.exported_at.is_empty());
    assert!(!doc.tables.contains_key("schema_version"));
    assert_eq!(doc.tables["characters"].len(), 3);
    assert_eq!(doc.tables["dock_config"].len(), 5);
    assert_eq!(doc.tables["prompts"].len(), 1);

    let nova = doc.tables["characters"]
        .iter()
        .find(|row| row["name"] == json!("Nova"))
        .unwrap();
    assert_eq!(nova["status"], json!("active"));
    assert_eq!(nova["archetype_id"], serde_json::Value::Null);
    assert!(nova["id"].is_i64());
}

#[tokio::test]
async fn test_round_trip_into_empty_database() {
    let source = populated().await;
    let doc = serde_json::to_value(export_database(&source).await.unwrap()).unwrap();

    let target = memory_db().await;
    let summary = import_database(&target, &doc).await.unwrap();
    assert_eq!(summary.skipped, 0);

    let mut expected = 0;
    for table in IMPORT_ORDER {
        let n = count(&source, table).await;
        assert_eq!(count(&target, table).await, n, "row count for {}", table);
        expected += n as usize;
    }
    assert_eq!(summary.imported, expected);

    // Tables outside the import order are not restored
    assert_eq!(count(&target, "projects").await, 0);
    assert_eq!(count(&target, "prompts").await, 0);

    // Importing the same file again skips every row
    let again = import_database(&target, &doc).await.unwrap();
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, expected);
}

#[tokio::test]
async fn test_unknown_columns_dropped_and_unlisted_tables_ignored() {
    let pool = memory_db().await;
    let doc = json!({
        "tables": {
            "output_types": [
                {"id": 7, "name": "Poster", "legacy_field": "x"},
                {"nothing": "useful"}
            ],
            "mystery_table": [{"id": 1, "name": "ghost"}],
            "projects": [{"id": 1, "name": "Not restored"}]
        }
    });

    let summary = import_database(&pool, &doc).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 0);

    let name: String = sqlx::query_scalar("SELECT name FROM output_types WHERE id = 7")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Poster");
    assert_eq!(count(&pool, "projects").await, 0);
}

#[tokio::test]
async fn test_rejected_rows_count_as_skipped() {
    let pool = memory_db().await;
    let doc = json!({
        "tables": {
            "characters": [
                {"id": 1, "name": "Valid"},
                {"id": 2, "name": "Bad status", "status": "sleeping"},
                {"id": 3, "name": "Dangling", "archetype_id": 42}
            ]
        }
    });

    let summary = import_database(&pool, &doc).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(count(&pool, "characters").await, 1);
}

#[tokio::test]
async fn test_missing_tables_section_imports_nothing() {
    let pool = memory_db().await;
    let summary = import_database(&pool, &json!({"version": "0.2"})).await.unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.skipped, 0);
}

#[tokio::test]
async fn test_export_reads_one_snapshot() {
    let temp = tempfile::tempdir().unwrap();
    let pool = db::init_database(&temp.path().join("pipeline.db")).await.unwrap();
    let s = seed(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let parents = export_tables(&mut *tx, &["render_jobs".to_string()])
        .await
        .unwrap();

    // A job and its links written after the parent table was read
    jobs::create_job_with_ingredients(
        &pool,
        &job(s.atlas, s.portrait, JobStatus::Planned),
        &[s.blue_coat, s.dusk],
    )
    .await
    .unwrap();

    let children = export_tables(&mut *tx, &["render_job_ingredients".to_string()])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let job_ids: Vec<&serde_json::Value> =
        parents["render_jobs"].iter().map(|row| &row["id"]).collect();
    assert_eq!(job_ids.len(), 3);
    for link in &children["render_job_ingredients"] {
        assert!(job_ids.contains(&&link["job_id"]), "orphan link {:?}", link);
    }

    let doc = export_database(&pool).await.unwrap();
    assert_eq!(doc.tables["render_jobs"].len(), 4);
}

#[tokio::test]
async fn test_null_text_field_counts_as_skipped() {
    let pool = memory_db().await;
    let doc = json!({
        "tables": {
            "media_assets": [
                {"id": 1, "title": "Kept", "description": "Cut one"},
                {"id": 2, "title": "Also kept"},
                {"id": 3, "title": "Old export", "description": null}
            ]
        }
    });

    let summary = import_database(&pool, &doc).await.unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(count(&pool, "media_assets").await, 2);
}
