use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub message: String }

#[derive(ToSchema)]
pub struct SignupRequest { pub name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResetPasswordRequest { pub email: String, pub new_password: String }

#[derive(ToSchema)]
pub struct ProfileUpdateRequest {
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

#[derive(ToSchema)]
pub struct LocationDoc { pub name: String, pub lat: f64, pub lng: f64 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct StoryRequest {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    /// Personal, Community, History or Culture
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_anonymous: Option<bool>,
    pub location: Option<LocationDoc>,
    pub circle: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub language: Option<String>,
    pub profile_image: Option<String>,
    pub context: Option<String>,
}

#[derive(ToSchema)]
pub struct CommentRequest { pub text: String }

#[derive(ToSchema)]
pub struct StatusChangeRequest {
    /// pending, approved or rejected
    pub status: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::reset_password,
        crate::routes::auth::verify,
        crate::routes::users::search,
        crate::routes::users::profile,
        crate::routes::users::update_profile,
        crate::routes::users::follow,
        crate::routes::users::unfollow,
        crate::routes::stories::list,
        crate::routes::stories::get,
        crate::routes::stories::create,
        crate::routes::stories::create_bulk,
        crate::routes::stories::update,
        crate::routes::stories::delete,
        crate::routes::stories::like,
        crate::routes::stories::bookmarks,
        crate::routes::stories::comments,
        crate::routes::stories::add_comment,
        crate::routes::uploads::upload_avatar,
        crate::routes::admin::list_stories,
        crate::routes::admin::set_story_status,
        crate::routes::catalog::circles,
        crate::routes::catalog::circle,
        crate::routes::catalog::prompts,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            LoginRequest,
            ResetPasswordRequest,
            ProfileUpdateRequest,
            LocationDoc,
            StoryRequest,
            CommentRequest,
            StatusChangeRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "stories"),
        (name = "interactions"),
        (name = "uploads"),
        (name = "admin"),
        (name = "catalog")
    )
)]
pub struct ApiDoc;
