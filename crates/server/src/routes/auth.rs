use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::types::MessageBody;
use service::auth::{
    domain::{AuthSession, LoginInput, ResetPasswordInput, SignupInput},
    Claims,
};
use service::users::PublicUser;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

#[utoipa::path(post, path = "/api/auth/signup", tag = "auth", request_body = crate::openapi::SignupRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn signup(
    State(state): State<ServerState>,
    body: Result<Json<SignupInput>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    let Json(input) = body?;
    let session = state.auth.signup(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthSession>), ApiError> {
    let Json(input) = body?;
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(post, path = "/api/auth/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordRequest,
    responses((status = 200, description = "Password reset"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn reset_password(
    State(state): State<ServerState>,
    body: Result<Json<ResetPasswordInput>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let Json(input) = body?;
    state.auth.reset_password(input).await?;
    Ok(Json(MessageBody::new("Password reset successful")))
}

#[utoipa::path(get, path = "/api/auth/verify", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized"), (status = 403, description = "Forbidden")))]
pub async fn verify(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PublicUser>, ApiError> {
    Ok(Json(state.auth.current_user(&claims).await?))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

/// Bearer token from `Authorization`, falling back to the `auth_token` cookie.
fn extract_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    CookieJar::from_headers(req.headers())
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Verifies the caller's token and stores its [`Claims`] in the request extensions.
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let Some(token) = extract_token(&req) else {
        warn!(path = %req.uri().path(), "missing bearer token");
        return ApiError::new(StatusCode::UNAUTHORIZED, "Access token required").into_response();
    };
    match state.auth.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!(path = %req.uri().path(), error = %e, "rejected bearer token");
            ApiError::from(e).into_response()
        }
    }
}
