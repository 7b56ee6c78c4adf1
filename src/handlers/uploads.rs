use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::schemas::{AppState, ErrorResponse};

/// Upload response carrying the relative URL of the stored image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

/// Store an uploaded image under the configured root and return its
/// relative URL. The stored name is a random UUID with the original
/// extension (lowercased, `bin` when absent), so uploads never collide
/// with or overwrite each other by name.
#[utoipa::path(
    post,
    path = "/api/admin/upload-image",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 500, description = "Failed to store the file", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn upload_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("Empty file".to_string()));
        }

        let extension = original_name
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "bin".to_string());
        let filename = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&state.upload_root)
            .await
            .map_err(|e| {
                error!("Failed to create upload directory: {}", e);
                ApiError::Internal("Failed to store file".to_string())
            })?;

        let target = state.upload_root.join(&filename);
        tokio::fs::write(&target, &data).await.map_err(|e| {
            error!("Failed to write uploaded file: {}", e);
            ApiError::Internal("Failed to store file".to_string())
        })?;

        info!("Stored uploaded image as {}", filename);
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: format!("/uploads/{filename}"),
            }),
        ));
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}
