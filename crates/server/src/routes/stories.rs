use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::MessageBody;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::{
    auth::Claims,
    pagination::Pagination,
    stories::{Comment, ReactionKind, ReactionState, Story, StoryCategory, StoryFilter, StoryInput, StoryUpdate},
};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub circle: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> Result<(StoryFilter, Option<Pagination>), ApiError> {
        let category = match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => Some(c.parse::<StoryCategory>()?),
            None => None,
        };
        let page = self.page.map(|page| Pagination {
            page,
            per_page: self.per_page.unwrap_or(Pagination::default().per_page),
        });
        let filter = StoryFilter { circle: self.circle.filter(|c| !c.is_empty()), category, ..StoryFilter::default() };
        Ok((filter, page))
    }
}

#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub message: String,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Serialize)]
pub struct CreatedStory {
    pub story: Story,
}

#[derive(Debug, Serialize)]
pub struct CreatedStories {
    pub stories: Vec<Story>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeltThisResponse {
    pub felt_this: bool,
    pub felt_this_count: u32,
}

#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    pub bookmarked: bool,
}

#[utoipa::path(get, path = "/api/stories", tag = "stories",
    params(
        ("circle" = Option<String>, Query, description = "Circle id"),
        ("category" = Option<String>, Query, description = "Personal, Community, History or Culture"),
        ("page" = Option<u32>, Query, description = "1-based page; omit for every story"),
        ("perPage" = Option<u32>, Query, description = "Page size, at most 100"),
    ),
    responses((status = 200, description = "Approved stories, newest first")))]
pub async fn list(State(state): State<ServerState>, Query(query): Query<ListQuery>) -> Result<Json<Vec<Story>>, ApiError> {
    let (filter, page) = query.into_parts()?;
    Ok(Json(state.stories.list_public(filter, page).await?))
}

#[utoipa::path(get, path = "/api/stories/{id}", tag = "stories", params(("id" = String, Path, description = "Story id")),
    responses((status = 200, description = "Story"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Story>, ApiError> {
    Ok(Json(state.stories.get_public(&id).await?))
}

#[utoipa::path(post, path = "/api/stories", tag = "stories", security(("bearer" = [])),
    request_body = crate::openapi::StoryRequest,
    responses((status = 201, description = "Story shared"), (status = 401, description = "Unauthorized")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<StoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<CreatedStory>>), ApiError> {
    let Json(input) = body?;
    let story = state.stories.create(&claims, input).await?;
    let out = Created { message: "Story shared successfully".into(), body: CreatedStory { story } };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/api/stories/bulk", tag = "stories", security(("bearer" = [])),
    request_body = [crate::openapi::StoryRequest],
    responses((status = 201, description = "Stories shared"), (status = 400, description = "Body is not an array")))]
pub async fn create_bulk(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Created<CreatedStories>>), ApiError> {
    let Json(value) = body?;
    if !value.is_array() {
        return Err(ApiError::bad_request("Request body must be an array of stories"));
    }
    let inputs: Vec<StoryInput> = serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let stories = state.stories.create_many(&claims, inputs).await?;
    let out = Created {
        message: format!("{} stories shared successfully", stories.len()),
        body: CreatedStories { stories },
    };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(put, path = "/api/stories/{id}", tag = "stories", security(("bearer" = [])),
    params(("id" = String, Path, description = "Story id")),
    request_body = crate::openapi::StoryRequest,
    responses((status = 200, description = "Updated story"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<StoryUpdate>, JsonRejection>,
) -> Result<Json<Story>, ApiError> {
    let Json(update) = body?;
    Ok(Json(state.stories.update(&claims, &id, update).await?))
}

#[utoipa::path(delete, path = "/api/stories/{id}", tag = "stories", security(("bearer" = [])),
    params(("id" = String, Path, description = "Story id")),
    responses((status = 200, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state.stories.delete(&claims, &id).await?;
    Ok(Json(MessageBody::new("Story deleted successfully")))
}

#[utoipa::path(post, path = "/api/stories/{id}/like", tag = "interactions", security(("bearer" = [])),
    params(("id" = String, Path, description = "Story id")),
    responses((status = 200, description = "Like toggled"), (status = 404, description = "Not Found")))]
pub async fn like(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let out = state.stories.toggle_reaction(&claims, &id, ReactionKind::Like).await?;
    Ok(Json(LikeResponse { liked: out.active, likes: out.count }))
}

pub async fn felt_this(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FeltThisResponse>, ApiError> {
    let out = state.stories.toggle_reaction(&claims, &id, ReactionKind::FeltThis).await?;
    Ok(Json(FeltThisResponse { felt_this: out.active, felt_this_count: out.count }))
}

pub async fn bookmark(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let out = state.stories.toggle_reaction(&claims, &id, ReactionKind::Bookmark).await?;
    Ok(Json(BookmarkResponse { bookmarked: out.active }))
}

pub async fn reactions(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ReactionState>, ApiError> {
    Ok(Json(state.stories.reactions(&claims, &id).await?))
}

#[utoipa::path(get, path = "/api/bookmarks", tag = "interactions", security(("bearer" = [])),
    responses((status = 200, description = "Bookmarked stories")))]
pub async fn bookmarks(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Story>>, ApiError> {
    Ok(Json(state.stories.bookmarks(&claims).await?))
}

#[utoipa::path(get, path = "/api/stories/{id}/comments", tag = "interactions",
    params(("id" = String, Path, description = "Story id")),
    responses((status = 200, description = "Comments, newest first"), (status = 404, description = "Not Found")))]
pub async fn comments(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.stories.comments(&id).await?))
}

#[utoipa::path(post, path = "/api/stories/{id}/comments", tag = "interactions", security(("bearer" = [])),
    params(("id" = String, Path, description = "Story id")),
    request_body = crate::openapi::CommentRequest,
    responses((status = 201, description = "Comment added"), (status = 400, description = "Empty text"), (status = 404, description = "Not Found")))]
pub async fn add_comment(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<CommentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(input) = body?;
    let comment = state.stories.add_comment(&claims, &id, &input.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
