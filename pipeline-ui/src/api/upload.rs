//! Image upload: clipboard paste (JSON base64) or file drop (multipart)
//!
//! Files are stored in the images directory under a random hex name and
//! served back from [`crate::IMAGES_URL_PREFIX`].

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    Json,
};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, ApiError, ApiResult, IMAGES_URL_PREFIX};

/// Extensions accepted for dropped files
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

const NO_IMAGE: &str = "No image received";

/// Pasted image payload
#[derive(Debug, Deserialize)]
pub struct PastedImage {
    #[serde(default)]
    pub image_b64: String,
    #[serde(default)]
    pub mime: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}

/// Base64 body of a data URI, or the input unchanged when there is no prefix
pub fn strip_data_uri(b64: &str) -> &str {
    match b64.split_once(',') {
        Some((_, data)) => data,
        None => b64,
    }
}

/// Extension for a pasted image: jpg for JPEG mime types, png otherwise
pub fn pasted_extension(mime: &str) -> &'static str {
    if mime.contains("jpeg") {
        "jpg"
    } else {
        "png"
    }
}

/// Extension for a dropped file, lowercased; png when the name has none
pub fn dropped_extension(file_name: &str) -> ApiResult<String> {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => "png".to_string(),
    };
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ApiError::BadRequest("Unsupported format".to_string()))
    }
}

async fn save_image(dir: &Path, ext: &str, bytes: &[u8]) -> ApiResult<UploadResponse> {
    let filename = format!("{}.{}", Uuid::new_v4().simple(), ext);
    tokio::fs::write(dir.join(&filename), bytes).await?;
    info!("Saved image {} ({} bytes)", filename, bytes.len());

    Ok(UploadResponse {
        url: format!("{}/{}", IMAGES_URL_PREFIX, filename),
        filename,
    })
}

/// POST /upload-image
///
/// A JSON body carries `{image_b64, mime}`; a multipart body carries the file
/// in the `image` field.
pub async fn upload_image(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<UploadResponse>> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("application/json") {
        let Json(pasted) = Json::<PastedImage>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let data = strip_data_uri(pasted.image_b64.trim());
        if data.is_empty() {
            return Err(ApiError::BadRequest(NO_IMAGE.to_string()));
        }
        let bytes = BASE64_STANDARD
            .decode(data)
            .map_err(|e| ApiError::BadRequest(format!("Invalid base64 image data: {}", e)))?;
        let saved = save_image(&state.images_dir, pasted_extension(&pasted.mime), &bytes).await?;
        return Ok(Json(saved));
    }

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            if field.name() != Some("image") {
                continue;
            }
            let ext = dropped_extension(field.file_name().unwrap_or_default())?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let saved = save_image(&state.images_dir, &ext, &bytes).await?;
            return Ok(Json(saved));
        }
    }

    Err(ApiError::BadRequest(NO_IMAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,iVBORw0"), "iVBORw0");
        assert_eq!(strip_data_uri("iVBORw0"), "iVBORw0");
    }

    #[test]
    fn test_pasted_extension() {
        assert_eq!(pasted_extension("image/jpeg"), "jpg");
        assert_eq!(pasted_extension("image/png"), "png");
        assert_eq!(pasted_extension(""), "png");
    }

    #[test]
    fn test_dropped_extension() {
        assert_eq!(dropped_extension("Shot.JPEG").unwrap(), "jpeg");
        assert_eq!(dropped_extension("clipboard").unwrap(), "png");
        assert!(matches!(
            dropped_extension("notes.txt"),
            Err(ApiError::BadRequest(msg)) if msg == "Unsupported format"
        ));
    }
}
