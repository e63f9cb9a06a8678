//! Shared setup for pipeline-ui HTTP tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pipeline_common::db;
use pipeline_common::models::{
    CategoryInput, CharacterInput, CharacterStatus, DbId, IngredientInput, JobInput, JobStatus,
    OutputTypeInput,
};
use pipeline_ui::{build_router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub images: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub async fn test_app() -> TestApp {
    let pool = db::init_memory_database().await.unwrap();
    let images = tempfile::tempdir().unwrap();
    let state = AppState::new(pool, images.path().to_path_buf());
    TestApp {
        router: build_router(state.clone()),
        state,
        images,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, json: serde_json::Value) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a multipart form with a single file field
    pub async fn post_file(&self, uri: &str, field: &str, file_name: &str, bytes: &[u8]) -> Response {
        let boundary = "pipeline-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                b = boundary,
                f = field,
                n = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// Ids of the records created by [`seed`]
pub struct Seed {
    pub nova: DbId,
    pub wardrobe: DbId,
    pub lighting: DbId,
    pub red_cape: DbId,
    pub dusk: DbId,
    pub portrait: DbId,
    pub job: DbId,
}

/// Nova (tags "hero") in a Portrait that requires Wardrobe and Lighting,
/// with one rendered job using Red Cape and Dusk Lighting
pub async fn seed(app: &TestApp) -> Seed {
    let pool = &app.state.db;

    let nova = db::characters::create_character(
        pool,
        &CharacterInput {
            name: "Nova".into(),
            archetype_id: None,
            description: "Star pilot".into(),
            visual_notes: String::new(),
            status: CharacterStatus::Active,
            tags: "hero".into(),
            image_path: String::new(),
        },
    )
    .await
    .unwrap();

    let category = |name: &str| CategoryInput {
        name: name.into(),
        description: String::new(),
    };
    let wardrobe = db::ingredients::create_category(pool, &category("Wardrobe")).await.unwrap();
    let lighting = db::ingredients::create_category(pool, &category("Lighting")).await.unwrap();

    let ingredient = |category_id: DbId, code: &str, name: &str| IngredientInput {
        category_id: Some(category_id),
        code: code.into(),
        name: name.into(),
        description: String::new(),
    };
    let red_cape = db::ingredients::create_ingredient(pool, &ingredient(wardrobe, "W1", "Red Cape"))
        .await
        .unwrap();
    let dusk = db::ingredients::create_ingredient(pool, &ingredient(lighting, "L1", "Dusk Lighting"))
        .await
        .unwrap();

    let portrait = db::output_types::create_output_type(
        pool,
        &OutputTypeInput {
            name: "Portrait".into(),
            description: String::new(),
        },
    )
    .await
    .unwrap();
    db::output_types::add_requirement(pool, portrait, wardrobe).await.unwrap();
    db::output_types::add_requirement(pool, portrait, lighting).await.unwrap();

    let job = db::jobs::create_job_with_ingredients(
        pool,
        &JobInput {
            character_id: Some(nova),
            output_type_id: Some(portrait),
            status: JobStatus::Rendered,
            notes: String::new(),
        },
        &[red_cape, dusk],
    )
    .await
    .unwrap();

    Seed {
        nova,
        wardrobe,
        lighting,
        red_cape,
        dusk,
        portrait,
        job,
    }
}
