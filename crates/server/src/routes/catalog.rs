use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use service::catalog::{self, CircleDetail, PromptCategory, StoryCircle, WritingPrompt};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct PromptQuery {
    pub category: Option<String>,
}

impl PromptQuery {
    fn category(&self) -> Result<Option<PromptCategory>, ApiError> {
        match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => Ok(Some(c.parse::<PromptCategory>()?)),
            None => Ok(None),
        }
    }
}

#[utoipa::path(get, path = "/api/circles", tag = "catalog", responses((status = 200, description = "Circles with live story counts")))]
pub async fn circles(State(state): State<ServerState>) -> Result<Json<Vec<StoryCircle>>, ApiError> {
    Ok(Json(state.catalog.circles().await?))
}

#[utoipa::path(get, path = "/api/circles/{id}", tag = "catalog", params(("id" = String, Path, description = "Circle id")),
    responses((status = 200, description = "Circle and its approved stories"), (status = 404, description = "Not Found")))]
pub async fn circle(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<CircleDetail>, ApiError> {
    Ok(Json(state.catalog.circle(&id).await?))
}

#[utoipa::path(get, path = "/api/prompts", tag = "catalog",
    params(("category" = Option<String>, Query, description = "sensory, emotional, relational or temporal")),
    responses((status = 200, description = "Writing prompts")))]
pub async fn prompts(Query(query): Query<PromptQuery>) -> Result<Json<Vec<WritingPrompt>>, ApiError> {
    Ok(Json(catalog::prompts(query.category()?)))
}

pub async fn random_prompt(Query(query): Query<PromptQuery>) -> Result<Json<WritingPrompt>, ApiError> {
    catalog::random_prompt(query.category()?)
        .map(Json)
        .ok_or_else(|| ApiError::new(axum::http::StatusCode::NOT_FOUND, "No prompts found"))
}
