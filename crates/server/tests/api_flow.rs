use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use configs::AppConfig;
use serde_json::{json, Value};
use service::{
    users::{Role, UserRecord},
    Stores,
};
use tower::Service;
use uuid::Uuid;

struct TestApp {
    app: Router,
    stores: Stores,
}

async fn build_app_with(configure: impl FnOnce(&mut AppConfig)) -> anyhow::Result<TestApp> {
    let root = std::env::temp_dir().join(format!("echoes_api_{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.storage.data_dir = root.join("data").to_string_lossy().into_owned();
    cfg.storage.upload_dir = root.join("uploads").to_string_lossy().into_owned();
    cfg.storage.static_dir = root.join("dist").to_string_lossy().into_owned();
    configure(&mut cfg);

    let stores = Stores::file(&cfg.storage.data_dir).await?;
    let app = server::startup::build_app(stores.clone(), &cfg);
    Ok(TestApp { app, stores })
}

async fn build_app() -> anyhow::Result<TestApp> {
    build_app_with(|_| {}).await
}

impl TestApp {
    async fn send(&mut self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("authorization", format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
            None => req.body(Body::empty())?,
        };
        let resp = self.app.call(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    /// Sign up a fresh user; returns `(id, token)`.
    async fn signup(&mut self, name: &str) -> anyhow::Result<(String, String)> {
        let email = format!("{}_{}@example.com", name.to_lowercase(), Uuid::new_v4().simple());
        let (status, body) = self
            .send("POST", "/api/auth/signup", None, Some(json!({"name": name, "email": email, "password": "Sunday-bread-1"})))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Ok((body["id"].as_str().unwrap().to_string(), body["token"].as_str().unwrap().to_string()))
    }

    async fn promote(&self, id: &str) -> anyhow::Result<()> {
        let mut user = self.stores.users.get(id).await?.expect("user exists");
        user.role = Role::Admin;
        self.stores.users.upsert(user).await?;
        Ok(())
    }
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (status, body) = app.send("GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Echoes of Community API is running");
    Ok(())
}

#[tokio::test]
async fn signup_login_and_verify() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let email = format!("ana_{}@example.com", Uuid::new_v4().simple());

    let (status, body) = app
        .send("POST", "/api/auth/signup", None, Some(json!({"name": "Ana", "email": email, "password": "pan-dulce"})))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("password").is_none());
    let id = body["id"].as_str().unwrap().to_string();

    let stored = app.stores.users.get(&id).await?.unwrap();
    assert_ne!(stored.password_hash, "pan-dulce");
    assert!(stored.password_hash.starts_with("$argon2"));

    let (status, body) = app
        .send("POST", "/api/auth/signup", None, Some(json!({"name": "Ana", "email": email, "password": "other"})))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    let (status, body) = app.send("POST", "/api/auth/login", None, Some(json!({"email": email, "password": "wrong"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = app.send("POST", "/api/auth/login", None, Some(json!({"email": email}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");

    let (status, body) = app.send("POST", "/api/auth/login", None, Some(json!({"email": email, "password": "pan-dulce"}))).await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/api/auth/verify", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    Ok(())
}

#[tokio::test]
async fn protected_routes_check_tokens() -> anyhow::Result<()> {
    let mut app = build_app().await?;

    let (status, body) = app.send("GET", "/api/bookmarks", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required");

    let (status, body) = app.send("GET", "/api/bookmarks", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");

    let (_, token) = app.signup("Reader").await?;
    let (status, body) = app.send("GET", "/api/admin/stories", Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");
    Ok(())
}

#[tokio::test]
async fn follow_then_unfollow_updates_both_sides() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (ana, ana_token) = app.signup("Ana").await?;
    let (ben, _) = app.signup("Ben").await?;

    let (status, body) = app.send("POST", &format!("/api/users/{ben}/follow"), Some(&ana_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully followed user");
    assert_eq!((body["followersCount"].as_u64(), body["followingCount"].as_u64()), (Some(1), Some(1)));

    let (status, body) = app.send("POST", &format!("/api/users/{ben}/follow"), Some(&ana_token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already following this user");

    let (status, _) = app.send("POST", &format!("/api/users/{ana}/follow"), Some(&ana_token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, followers) = app.send("GET", &format!("/api/users/{ben}/followers"), None, None).await?;
    assert_eq!(followers[0]["id"], ana.as_str());
    let (_, profile) = app.send("GET", &format!("/api/users/{ben}"), None, None).await?;
    assert_eq!(profile["followersCount"], 1);

    let (status, body) = app.send("DELETE", &format!("/api/users/{ben}/unfollow"), Some(&ana_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((body["followersCount"].as_u64(), body["followingCount"].as_u64()), (Some(0), Some(0)));

    let (status, body) = app.send("DELETE", &format!("/api/users/{ben}/unfollow"), Some(&ana_token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Not following this user");

    let (_, following) = app.send("GET", &format!("/api/users/{ana}/following"), None, None).await?;
    assert_eq!(following, json!([]));
    Ok(())
}

#[tokio::test]
async fn profile_updates_are_owner_only() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (ana, ana_token) = app.signup("Ana").await?;
    let (_, ben_token) = app.signup("Ben").await?;

    let (status, body) = app.send("PUT", &format!("/api/users/{ana}"), Some(&ana_token), Some(json!({"bio": "baker"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "baker");

    let (status, body) = app.send("PUT", &format!("/api/users/{ana}"), Some(&ben_token), Some(json!({"bio": "x"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only update your own profile");

    let (status, found) = app.send("GET", "/api/users/search?q=ANA", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().iter().any(|u| u["id"] == ana.as_str()));

    let (status, body) = app.send("GET", "/api/users/search", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search query is required");
    Ok(())
}

#[tokio::test]
async fn moderation_controls_public_visibility() -> anyhow::Result<()> {
    let mut app = build_app_with(|cfg| cfg.stories.require_moderation = true).await?;
    let (_, author_token) = app.signup("Author").await?;
    let (admin, admin_token) = app.signup("Admin").await?;
    app.promote(&admin).await?;

    let (status, body) = app
        .send(
            "POST",
            "/api/stories",
            Some(&author_token),
            Some(json!({"title": "Bread", "content": "Sunday mornings", "circle": "grandmas-kitchen", "status": "approved"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Story shared successfully");
    assert_eq!(body["story"]["status"], "pending");
    let id = body["story"]["id"].as_str().unwrap().to_string();

    let (_, listed) = app.send("GET", "/api/stories", None, None).await?;
    assert_eq!(listed, json!([]));
    let (status, _) = app.send("GET", &format!("/api/stories/{id}"), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/admin/stories/{id}/status");
    let (status, body) = app.send("PUT", &uri, Some(&admin_token), Some(json!({"status": "approved"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Story approved successfully");

    let (_, listed) = app.send("GET", "/api/stories", None, None).await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    let (_, circles) = app.send("GET", "/api/circles", None, None).await?;
    let kitchen = circles.as_array().unwrap().iter().find(|c| c["id"] == "grandmas-kitchen").cloned().unwrap();
    assert_eq!(kitchen["storyCount"], 1);

    let (status, body) = app.send("PUT", &uri, Some(&admin_token), Some(json!({"status": "archived"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    let (status, _) = app.send("PUT", &uri, Some(&admin_token), Some(json!({"status": "rejected"}))).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = app.send("GET", "/api/stories", None, None).await?;
    assert_eq!(listed, json!([]));

    let (_, all) = app.send("GET", "/api/admin/stories", Some(&admin_token), None).await?;
    assert_eq!(all[0]["status"], "rejected");
    Ok(())
}

#[tokio::test]
async fn stories_edit_delete_and_bulk() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (_, author_token) = app.signup("Author").await?;
    let (_, other_token) = app.signup("Other").await?;

    let (status, body) = app
        .send("POST", "/api/stories", Some(&author_token), Some(json!({"title": "Market", "content": "Stalls", "image": "/m.jpg"})))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["story"]["images"], json!(["/m.jpg"]));
    assert_eq!(body["story"]["author"], "Author");
    let id = body["story"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/stories/{id}");
    let (status, body) = app.send("PUT", &uri, Some(&other_token), Some(json!({"title": "Mine"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to edit this story");

    let (status, body) = app.send("PUT", &uri, Some(&author_token), Some(json!({"title": "Night market"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Night market");

    let (status, body) = app.send("DELETE", &uri, Some(&other_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to delete this story");
    let (status, body) = app.send("DELETE", &uri, Some(&author_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Story deleted successfully");
    let (status, _) = app.send("DELETE", &uri, Some(&author_token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.send("POST", "/api/stories/bulk", Some(&author_token), Some(json!({"title": "one"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request body must be an array of stories");

    let batch = json!([{"title": "a", "content": "x"}, {"title": "b", "content": "y"}]);
    let (status, body) = app.send("POST", "/api/stories/bulk", Some(&author_token), Some(batch)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "2 stories shared successfully");

    let (_, page) = app.send("GET", "/api/stories?page=1&perPage=1", None, None).await?;
    assert_eq!(page.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn reactions_bookmarks_and_comments() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (_, token) = app.signup("Reader").await?;
    let (_, body) = app
        .send("POST", "/api/stories", Some(&token), Some(json!({"title": "Harbor", "content": "Gulls"})))
        .await?;
    let id = body["story"]["id"].as_str().unwrap().to_string();

    let (_, body) = app.send("POST", &format!("/api/stories/{id}/like"), Some(&token), None).await?;
    assert_eq!(body, json!({"liked": true, "likes": 1}));
    let (_, body) = app.send("POST", &format!("/api/stories/{id}/like"), Some(&token), None).await?;
    assert_eq!(body, json!({"liked": false, "likes": 0}));

    let (_, body) = app.send("POST", &format!("/api/stories/{id}/felt-this"), Some(&token), None).await?;
    assert_eq!(body, json!({"feltThis": true, "feltThisCount": 1}));
    let (_, body) = app.send("POST", &format!("/api/stories/{id}/bookmark"), Some(&token), None).await?;
    assert_eq!(body, json!({"bookmarked": true}));

    let (_, state) = app.send("GET", &format!("/api/stories/{id}/reactions"), Some(&token), None).await?;
    assert_eq!(state, json!({"liked": false, "feltThis": true, "bookmarked": true}));
    let (_, marks) = app.send("GET", "/api/bookmarks", Some(&token), None).await?;
    assert_eq!(marks[0]["id"], id.as_str());

    let (status, body) = app
        .send("POST", &format!("/api/stories/{id}/comments"), Some(&token), Some(json!({"text": "   "})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment text is required");
    let (status, _) = app
        .send("POST", &format!("/api/stories/{id}/comments"), Some(&token), Some(json!({"text": "I remember this"})))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, comments) = app.send("GET", &format!("/api/stories/{id}/comments"), None, None).await?;
    assert_eq!(comments[0]["text"], "I remember this");
    let (_, story) = app.send("GET", &format!("/api/stories/{id}"), None, None).await?;
    assert_eq!(story["comments"], 1);

    let (status, body) = app.send("POST", "/api/stories/missing/like", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Story not found");
    Ok(())
}

#[tokio::test]
async fn catalog_routes() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (_, circles) = app.send("GET", "/api/circles", None, None).await?;
    assert_eq!(circles.as_array().map(Vec::len), Some(6));

    let (status, body) = app.send("GET", "/api/circles/nowhere", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Circle not found");

    let (_, prompts) = app.send("GET", "/api/prompts?category=temporal", None, None).await?;
    assert_eq!(prompts.as_array().map(Vec::len), Some(3));
    let (_, prompt) = app.send("GET", "/api/prompts/random?category=sensory", None, None).await?;
    assert_eq!(prompt["category"], "sensory");
    Ok(())
}

#[tokio::test]
async fn stories_accept_inline_media_beyond_default_cap() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let (_, token) = app.signup("Photographer").await?;
    let photo = format!("data:image/jpeg;base64,{}", "A".repeat(3 * 1024 * 1024));

    let (status, body) = app
        .send("POST", "/api/stories", Some(&token), Some(json!({"title": "Harbor at dawn", "content": "Fog", "images": [photo]})))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body["message"]);
    let id = body["story"]["id"].as_str().unwrap().to_string();

    let audio = format!("data:audio/webm;base64,{}", "B".repeat(3 * 1024 * 1024));
    let (status, body) = app
        .send("PUT", &format!("/api/stories/{id}"), Some(&token), Some(json!({"audioUrl": audio, "hasAudio": true})))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body["message"]);
    Ok(())
}

#[tokio::test]
async fn oversized_story_body_is_payload_too_large() -> anyhow::Result<()> {
    let mut app = build_app_with(|cfg| cfg.server.json_body_limit = 64 * 1024).await?;
    let (_, token) = app.signup("Verbose").await?;
    let (status, _) = app
        .send("POST", "/api/stories", Some(&token), Some(json!({"title": "Long", "content": "x".repeat(128 * 1024)})))
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test]
async fn legacy_bcrypt_user_can_log_in() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let email = format!("legacy_{}@example.com", Uuid::new_v4().simple());
    let legacy = UserRecord::new("Legacy Admin", email.clone(), bcrypt::hash("password123", 4)?);
    let id = legacy.id.clone();
    app.stores.users.upsert(legacy).await?;

    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(json!({"email": email, "password": "password123"})))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body["message"]);
    assert_eq!(body["id"], id.as_str());
    assert!(app.stores.users.get(&id).await?.unwrap().password_hash.starts_with("$argon2"));

    let (status, _) = app
        .send("POST", "/api/auth/login", None, Some(json!({"email": email, "password": "password123"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
