//! Rewrite a legacy `users.json`, hashing every password that is still plaintext.
//!
//! Usage: `hash-passwords [path/to/users.json]` (default `<DATA_DIR>/users.json`).

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let path = match std::env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            let cfg = configs::AppConfig::load_and_validate()?;
            PathBuf::from(cfg.storage.data_dir).join("users.json")
        }
    };

    let report = service::import::hash_plaintext_passwords(&path)
        .await
        .with_context(|| format!("hashing passwords in {}", path.display()))?;
    info!(path = %path.display(), hashed = report.hashed, skipped = report.skipped, "passwords_hashed");
    println!("hashed {} password(s), {} already hashed", report.hashed, report.skipped);
    Ok(())
}
