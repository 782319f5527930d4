//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use configs::StorageConfig;

/// Ensure the storage directories exist; warn when there is no frontend bundle to serve.
pub async fn ensure_env(storage: &StorageConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&storage.static_dir, &storage.data_dir, &storage.upload_dir).await
}
