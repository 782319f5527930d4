//! Avatar image storage under `<upload_dir>/avatars`.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::errors::ServiceError;

pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Allowed MIME types and the extensions stored for each; the first is the default.
const ALLOWED_TYPES: [(&str, &[&str]); 4] = [
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/webp", &["webp"]),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub filename: String,
}

pub struct AvatarStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl AvatarStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self { root: upload_dir.into(), max_bytes: MAX_AVATAR_BYTES }
    }

    pub fn max_bytes(&self) -> usize { self.max_bytes }

    /// Validate and write an avatar, returning its public URL.
    pub async fn save_avatar(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, ServiceError> {
        let extensions = content_type
            .and_then(|ct| ALLOWED_TYPES.iter().find(|(mime, _)| ct.eq_ignore_ascii_case(mime)))
            .map(|(_, exts)| *exts)
            .ok_or_else(|| {
                ServiceError::Validation("Invalid file type. Only JPEG, PNG, GIF, and WebP are allowed.".into())
            })?;
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::PayloadTooLarge("File too large. Maximum size is 5MB".into()));
        }

        // stored extension always matches the declared type
        let ext = original_name
            .and_then(extension_of)
            .filter(|ext| extensions.contains(&ext.as_str()))
            .unwrap_or_else(|| extensions[0].to_string());
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let filename = format!("avatar-{}-{}.{}", chrono::Utc::now().timestamp_millis(), suffix, ext);

        let dir = self.root.join("avatars");
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&filename), bytes).await?;
        info!(filename = %filename, size = bytes.len(), "avatar_stored");
        Ok(StoredUpload { url: format!("/uploads/avatars/{}", filename), filename })
    }
}

/// Lowercased extension of a client file name, if it is short and alphanumeric.
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> AvatarStorage {
        AvatarStorage::new(std::env::temp_dir().join(format!("avatars_{}", uuid::Uuid::new_v4())))
    }

    #[tokio::test]
    async fn stores_allowed_image() -> anyhow::Result<()> {
        let storage = storage();
        let saved = storage.save_avatar(Some("Me.PNG"), Some("image/png"), b"\x89PNG").await?;
        assert!(saved.filename.starts_with("avatar-"));
        assert!(saved.filename.ends_with(".png"));
        assert_eq!(saved.url, format!("/uploads/avatars/{}", saved.filename));
        assert!(storage.root.join("avatars").join(&saved.filename).exists());

        let jpeg = storage.save_avatar(Some("holiday.jpeg"), Some("image/jpeg"), b"\xff\xd8").await?;
        assert!(jpeg.filename.ends_with(".jpeg"));
        let unnamed = storage.save_avatar(None, Some("image/webp"), b"RIFF").await?;
        assert!(unnamed.filename.ends_with(".webp"));
        Ok(())
    }

    #[tokio::test]
    async fn extension_follows_declared_type_not_file_name() -> anyhow::Result<()> {
        let storage = storage();
        let saved = storage.save_avatar(Some("x.html"), Some("image/png"), b"<script>alert(1)</script>").await?;
        assert!(saved.filename.ends_with(".png"), "{}", saved.filename);
        let saved = storage.save_avatar(Some("cat.gif"), Some("image/jpeg"), b"\xff\xd8").await?;
        assert!(saved.filename.ends_with(".jpg"), "{}", saved.filename);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_wrong_type_and_oversize() {
        let storage = storage();
        let bad = storage.save_avatar(Some("a.svg"), Some("image/svg+xml"), b"<svg/>").await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));

        let big = vec![0u8; MAX_AVATAR_BYTES + 1];
        let too_big = storage.save_avatar(Some("a.jpg"), Some("image/jpeg"), &big).await;
        assert!(matches!(too_big, Err(ServiceError::PayloadTooLarge(_))));
    }

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(extension_of("photo.JPeG").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("../../etc/passwd"), None);
        assert_eq!(extension_of("x.p/h"), None);
    }
}
