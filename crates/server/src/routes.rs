use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod stories;
pub mod uploads;
pub mod users;

/// Multipart framing on top of the avatar limit, so an oversized image still
/// reaches the size check and gets its own message.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: public, authenticated and admin API
/// routes, uploaded files, API docs and the frontend bundle.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users/search", get(users::search))
        .route("/api/users/:id", get(users::profile))
        .route("/api/users/:id/followers", get(users::followers))
        .route("/api/users/:id/following", get(users::following))
        .route("/api/users/:id/stories", get(users::stories))
        .route("/api/stories", get(stories::list))
        .route("/api/stories/:id", get(stories::get))
        .route("/api/stories/:id/comments", get(stories::comments))
        .route("/api/circles", get(catalog::circles))
        .route("/api/circles/:id", get(catalog::circle))
        .route("/api/prompts", get(catalog::prompts))
        .route("/api/prompts/random", get(catalog::random_prompt));

    let avatar_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD;
    let story_limit = DefaultBodyLimit::max(state.limits.story_json);
    let protected = Router::new()
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/users/:id", put(users::update_profile))
        .route("/api/users/:id/follow", post(users::follow))
        .route("/api/users/:id/unfollow", delete(users::unfollow))
        .route("/api/stories", post(stories::create).layer(story_limit))
        .route("/api/stories/bulk", post(stories::create_bulk).layer(story_limit))
        .route("/api/stories/:id", put(stories::update).layer(story_limit).delete(stories::delete))
        .route("/api/stories/:id/like", post(stories::like))
        .route("/api/stories/:id/felt-this", post(stories::felt_this))
        .route("/api/stories/:id/bookmark", post(stories::bookmark))
        .route("/api/stories/:id/reactions", get(stories::reactions))
        .route("/api/stories/:id/comments", post(stories::add_comment))
        .route("/api/bookmarks", get(stories::bookmarks))
        .route(
            "/api/upload/avatar",
            post(uploads::upload_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    // route_layer order: the last layer added runs first, so auth precedes the role check
    let admin_routes = Router::new()
        .route("/api/admin/stories", get(admin::list_stories))
        .route("/api/admin/stories/:id/status", put(admin::set_story_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let static_dir = &state.paths.static_dir;
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    public
        .merge(protected)
        .merge(admin_routes)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(&state.paths.upload_dir))
        .fallback_service(frontend)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
