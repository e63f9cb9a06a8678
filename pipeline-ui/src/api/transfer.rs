//! Whole-database export download and import upload

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use pipeline_common::transfer::{export_database, export_filename, import_database, parse_export};
use tracing::{info, warn};

use crate::{AppState, ApiError, ApiResult};

/// GET /export
pub async fn export_data(State(state): State<AppState>) -> ApiResult<Response> {
    let document = export_database(&state.db).await?;
    let body = serde_json::to_string_pretty(&document).map_err(pipeline_common::Error::from)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(Utc::now()));
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("Invalid export filename: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Uploaded export file
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of the form, if any
async fn read_file_field(multipart: &mut Multipart) -> ApiResult<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok(Some(UploadedFile {
            name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// POST /import
///
/// Every outcome is reported as a flash message on the data page.
pub async fn import_data(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Redirect> {
    let redirect = Redirect::to("/data");

    let file = match multipart {
        Ok(mut multipart) => read_file_field(&mut multipart).await?,
        Err(rejection) => {
            warn!("Import without multipart body: {}", rejection.body_text());
            None
        }
    };

    let Some(file) = file else {
        state.flash.push("No file selected.").await;
        return Ok(redirect);
    };

    if !file.name.ends_with(".json") {
        state.flash.push("Please upload a .json export file.").await;
        return Ok(redirect);
    }

    let document = match parse_export(&file.bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!("Import file {} could not be parsed: {}", file.name, e);
            state.flash.push(format!("Could not parse file: {}", e)).await;
            return Ok(redirect);
        }
    };

    info!("Importing {} ({} bytes)", file.name, file.bytes.len());
    let summary = import_database(&state.db, &document).await?;
    state
        .flash
        .push(format!(
            "Import complete: {} records added, {} skipped (already existed).",
            summary.imported, summary.skipped
        ))
        .await;

    Ok(redirect)
}
