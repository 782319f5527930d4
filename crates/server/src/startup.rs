use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, StorageBackend};
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::{runtime, Stores};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad listen address: {e}")))
}

/// Open the configured backend; Postgres is migrated before use.
pub async fn open_stores(cfg: &AppConfig) -> anyhow::Result<Stores> {
    match cfg.storage.backend {
        StorageBackend::File => {
            info!(data_dir = %cfg.storage.data_dir, "using JSON file storage");
            Ok(Stores::file(&cfg.storage.data_dir).await?)
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None).await?;
            info!("using Postgres storage");
            Ok(Stores::postgres(db))
        }
    }
}

/// Build the application for an already opened set of stores.
pub fn build_app(stores: Stores, cfg: &AppConfig) -> Router {
    routes::build_router(ServerState::new(stores, cfg), build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: load config, open storage, and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    runtime::ensure_env(&cfg.storage)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let stores = open_stores(&cfg).await?;
    let app = build_app(stores, &cfg);

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, backend = ?cfg.storage.backend, moderation = cfg.stories.require_moderation, "echoes server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
