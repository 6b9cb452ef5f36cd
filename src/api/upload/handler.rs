//! Photo Upload Handler
//!
//! Accepts one photo per request, validates it decodes as an image, and
//! stores it as `<uuid>.jpg` in the upload root. Every stored file is
//! re-encoded to JPEG so order folders hold a uniform format.

use std::io::Cursor;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use uuid::Uuid;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Maximum upload size (20MB - full-resolution photos)
const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// JPEG quality for stored photos
const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub original_name: String,
    pub size: usize,
}

/// Decode and re-encode as RGB JPEG. Rejects anything that is not a
/// decodable image.
fn reencode_jpeg(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {e}")))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to encode image: {e}")))?;
    }

    Ok(buffer)
}

/// Upload handler
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload_root = state.upload_root();
    tokio::fs::create_dir_all(&upload_root)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create upload directory: {e}")))?;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_name = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            original_name = field.file_name().map(|s| s.to_string());
            field_data = Some(field.bytes().await?.to_vec());
            break;
        }
    }

    let data = field_data
        .ok_or_else(|| AppError::validation("No 'file' field found. Field name must be 'file'"))?;
    let original_name = original_name.unwrap_or_else(|| "photo".to_string());

    if data.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let jpeg = reencode_jpeg(&data)?;

    // Content-independent stored name; the stored file stays loose in the
    // upload root until checkout (or recovery) claims it.
    let file_name = format!("{}.jpg", Uuid::new_v4());
    let file_path = upload_root.join(&file_name);

    tokio::fs::write(&file_path, &jpeg)
        .await
        .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;

    tracing::info!(
        original_name = %original_name,
        stored_name = %file_name,
        size = jpeg.len(),
        "Photo uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        file_name,
        original_name,
        size: jpeg.len(),
    }))
}
