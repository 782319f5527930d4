use std::net::SocketAddr;

use configs::AppConfig;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{multipart, StatusCode as HttpStatusCode};
use serde_json::{json, Value};
use service::Stores;
use tokio::net::TcpListener;
use uuid::Uuid;

const SECRET: &str = "e2e-secret";

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let root = std::env::temp_dir().join(format!("echoes_e2e_{}", Uuid::new_v4()));
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = SECRET.into();
    cfg.storage.data_dir = root.join("data").to_string_lossy().into_owned();
    cfg.storage.upload_dir = root.join("uploads").to_string_lossy().into_owned();
    cfg.storage.static_dir = root.join("dist").to_string_lossy().into_owned();
    service::runtime::ensure_env(&cfg.storage).await?;
    tokio::fs::create_dir_all(&cfg.storage.static_dir).await?;
    tokio::fs::write(root.join("dist").join("index.html"), "<html>echoes</html>").await?;

    let stores = Stores::file(&cfg.storage.data_dir).await?;
    let app = server::startup::build_app(stores, &cfg);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()) })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().expect("reqwest client")
}

async fn signup_and_login(c: &reqwest::Client, base: &str) -> anyhow::Result<Value> {
    let email = format!("e2e_{}@example.com", Uuid::new_v4().simple());
    let res = c
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({"name": "Edda", "email": email, "password": "fjord-light"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let res = c
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": email, "password": "fjord-light"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.headers().get("set-cookie").is_some());
    Ok(res.json().await?)
}

#[tokio::test]
async fn e2e_health_docs_and_frontend() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let doc: Value = c.get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?.json().await?;
    assert!(doc["paths"]["/api/auth/signup"].is_object());

    let res = c.get(format!("{}/some/client/route", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("echoes"));
    Ok(())
}

#[tokio::test]
async fn e2e_cookie_session_and_logout() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let user = signup_and_login(&c, &app.base_url).await?;

    // no Authorization header: the auth_token cookie carries the session
    let res = c.get(format!("{}/api/auth/verify", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let me: Value = res.json().await?;
    assert_eq!(me["id"], user["id"]);

    let res = c.post(format!("{}/api/auth/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(format!("{}/api/auth/verify", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_expired_token_is_forbidden() -> anyhow::Result<()> {
    let app = start_server().await?;
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = json!({"id": "ghost", "email": "g@example.com", "name": "Ghost", "iat": now - 7200, "exp": now - 3600});
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))?;

    let res = reqwest::Client::new()
        .get(format!("{}/api/bookmarks", app.base_url))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn e2e_avatar_upload() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let user = signup_and_login(&c, &app.base_url).await?;
    let token = user["token"].as_str().unwrap().to_string();
    let url = format!("{}/api/upload/avatar", app.base_url);

    let png = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3];
    let part = multipart::Part::bytes(png.clone()).file_name("me.png").mime_str("image/png")?;
    let res = c.post(&url).bearer_auth(&token).multipart(multipart::Form::new().part("avatar", part)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Avatar uploaded successfully");
    let avatar_url = body["url"].as_str().unwrap().to_string();
    assert!(avatar_url.starts_with("/uploads/avatars/avatar-"));

    let served = c.get(format!("{}{}", app.base_url, avatar_url)).send().await?;
    assert_eq!(served.status(), HttpStatusCode::OK);
    assert_eq!(served.bytes().await?.to_vec(), png);

    let part = multipart::Part::bytes(b"plain".to_vec()).file_name("notes.txt").mime_str("text/plain")?;
    let res = c.post(&url).bearer_auth(&token).multipart(multipart::Form::new().part("avatar", part)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.post(&url).bearer_auth(&token).multipart(multipart::Form::new().text("other", "x")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "No file uploaded");

    let big = vec![0u8; 5 * 1024 * 1024 + 1];
    let part = multipart::Part::bytes(big).file_name("big.jpg").mime_str("image/jpeg")?;
    let res = c.post(&url).bearer_auth(&token).multipart(multipart::Form::new().part("avatar", part)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}
