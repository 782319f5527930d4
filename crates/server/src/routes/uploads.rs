use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Extension, Json,
};
use serde::Serialize;
use service::{auth::Claims, uploads::StoredUpload};
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::state::ServerState;

pub const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    #[serde(flatten)]
    pub upload: StoredUpload,
}

fn multipart_error(e: MultipartError) -> ApiError {
    warn!(error = %e.body_text(), "multipart read failed");
    ApiError::new(e.status(), e.body_text())
}

#[utoipa::path(post, path = "/api/upload/avatar", tag = "uploads", security(("bearer" = [])),
    request_body(content = String, content_type = "multipart/form-data", description = "Image in the `avatar` field"),
    responses((status = 200, description = "Stored"), (status = 400, description = "Missing or invalid file"), (status = 413, description = "Too large")))]
pub async fn upload_avatar(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let upload = state.uploads.save_avatar(file_name.as_deref(), content_type.as_deref(), &bytes).await?;
        info!(user_id = %claims.id, filename = %upload.filename, "avatar_uploaded");
        return Ok(Json(UploadResponse { message: "Avatar uploaded successfully".into(), upload }));
    }
    Err(ApiError::bad_request("No file uploaded"))
}
