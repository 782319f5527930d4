//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Ensure the data and upload directories exist; warn when the static
/// frontend bundle is missing.
pub async fn ensure_env(static_dir: &str, data_dir: &str, upload_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(%static_dir, "frontend assets directory not found; static assets may 404");
    }
    for dir in [data_dir, upload_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directories() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("echoes_env_{}", std::process::id()));
        let data = root.join("data");
        let uploads = root.join("uploads");
        ensure_env(
            root.join("dist").to_str().unwrap(),
            data.to_str().unwrap(),
            uploads.to_str().unwrap(),
        )
        .await?;
        assert!(tokio::fs::metadata(&data).await?.is_dir());
        assert!(tokio::fs::metadata(&uploads).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
