//! Image upload route handler.
//!
//! Accepts a multipart `image` field and stores it under the configured
//! upload directory, which is served statically at `/uploads`. Only
//! jpg/jpeg/png files are accepted, checked by both extension and mime type.

use axum::extract::{Multipart, State};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Accepted image extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Accepted image mime types.
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// `POST /upload` - store an uploaded image, responding with its public path
/// (admin).
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let extension = validate_image_field(field.file_name(), field.content_type())?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let filename = format!("image-{}.{extension}", Utc::now().timestamp_millis());
        let target = state.config().upload_dir.join(&filename);

        tokio::fs::create_dir_all(&state.config().upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create upload dir: {e}")))?;
        tokio::fs::write(&target, &data)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        tracing::info!(path = %target.display(), bytes = data.len(), "image uploaded");
        return Ok(format!("/uploads/{filename}"));
    }

    Err(AppError::Validation("No image file provided".to_owned()))
}

/// Check filename extension and mime type, returning the normalized
/// extension.
fn validate_image_field(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<String> {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));

    let mime_ok = content_type
        .is_some_and(|mime| ALLOWED_MIME_TYPES.contains(&mime.to_lowercase().as_str()));

    match (extension, mime_ok) {
        (Some(extension), true) => Ok(extension),
        _ => Err(AppError::Validation("Images only!".to_owned())),
    }
}
