//! Storage helpers for the file backend.
//!
//! Both stores keep the whole document in memory behind an `RwLock` and
//! rewrite the file on every mutation while the write lock is held, so
//! concurrent requests never lose each other's updates.

pub mod json_list_store;
pub mod json_map_store;

use std::path::Path;

use tokio::fs;

use crate::errors::ServiceError;

/// Write `bytes` next to `path` and rename over it, so readers never see a half-written file.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read a JSON document; `Ok(None)` when the file does not exist.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ServiceError> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ServiceError::Storage(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
