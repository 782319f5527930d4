use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common::types::MessageBody;
use serde::Deserialize;
use service::{auth::Claims, stories::Story};
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusChange {
    pub status: String,
}

/// Runs after [`super::auth::require_auth`]; the caller must hold the admin role.
pub async fn require_admin(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    req: Request,
    next: Next,
) -> Response {
    match state.auth.is_admin(&claims.id).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            warn!(user_id = %claims.id, path = %req.uri().path(), "admin access denied");
            ApiError::new(StatusCode::FORBIDDEN, "Admin access required").into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(get, path = "/api/admin/stories", tag = "admin", security(("bearer" = [])),
    responses((status = 200, description = "All stories"), (status = 403, description = "Forbidden")))]
pub async fn list_stories(State(state): State<ServerState>) -> Result<Json<Vec<Story>>, ApiError> {
    Ok(Json(state.stories.list_all().await?))
}

#[utoipa::path(put, path = "/api/admin/stories/{id}/status", tag = "admin", security(("bearer" = [])),
    params(("id" = String, Path, description = "Story id")),
    request_body = crate::openapi::StatusChangeRequest,
    responses((status = 200, description = "Status changed"), (status = 400, description = "Invalid status"), (status = 404, description = "Not Found")))]
pub async fn set_story_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(change) = body?;
    let story = state.stories.set_status(&id, &change.status).await?;
    Ok(Json(MessageBody::new(format!("Story {} successfully", story.status))))
}
