//! Injury photo upload.

use axum::extract::{Extension, Multipart};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;
use crate::server::routes::resolve_actor;

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

fn extension_of(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next()?.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Accepts multipart image fields and returns the served URLs. Any
/// authenticated user may upload; a URL only becomes meaningful once
/// attached to an injury the caller owns.
pub async fn upload_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    resolve_actor(&state, auth.as_deref()).await?;

    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart payload"))?
    {
        if field.file_name().is_none() {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(extension_of)
            .ok_or_else(|| ApiError::bad_request("Only image files are allowed"))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Failed to read upload"))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::bad_request("File too large (max 5MB)"));
        }

        urls.push(state.deps.images.store(&extension, bytes.to_vec()).await?);
    }

    if urls.is_empty() {
        return Err(ApiError::bad_request("No images provided"));
    }
    Ok(Json(json!({ "success": true, "urls": urls })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filtering() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("scan.webp").as_deref(), Some("webp"));
        assert!(extension_of("report.pdf").is_none());
        assert!(extension_of("noextension").is_none());
    }
}
