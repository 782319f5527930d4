use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use service::{
    auth::Claims,
    stories::Story,
    users::{FollowOutcome, ProfileUpdate, PublicUser, UserProfile, UserSummary},
};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[utoipa::path(get, path = "/api/users/search", tag = "users",
    params(("q" = String, Query, description = "Name or email fragment")),
    responses((status = 200, description = "Up to 20 matching profiles"), (status = 400, description = "Missing query")))]
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(state.users.search(query.q.as_deref()).await?))
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users", params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "Profile with follow counts"), (status = 404, description = "Not Found")))]
pub async fn profile(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.users.profile(&id).await?))
}

#[utoipa::path(put, path = "/api/users/{id}", tag = "users", security(("bearer" = [])),
    params(("id" = String, Path, description = "User id")),
    request_body = crate::openapi::ProfileUpdateRequest,
    responses((status = 200, description = "Updated user"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Json(update) = body?;
    Ok(Json(state.users.update_profile(&claims, &id, update).await?))
}

#[utoipa::path(post, path = "/api/users/{id}/follow", tag = "users", security(("bearer" = [])),
    params(("id" = String, Path, description = "User to follow")),
    responses((status = 200, description = "Followed"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn follow(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FollowOutcome>, ApiError> {
    Ok(Json(state.users.follow(&claims, &id).await?))
}

#[utoipa::path(delete, path = "/api/users/{id}/unfollow", tag = "users", security(("bearer" = [])),
    params(("id" = String, Path, description = "User to unfollow")),
    responses((status = 200, description = "Unfollowed"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn unfollow(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FollowOutcome>, ApiError> {
    Ok(Json(state.users.unfollow(&claims, &id).await?))
}

pub async fn followers(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.users.followers(&id).await?))
}

pub async fn following(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.users.following(&id).await?))
}

pub async fn stories(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Vec<Story>>, ApiError> {
    Ok(Json(state.users.stories(&id).await?))
}
