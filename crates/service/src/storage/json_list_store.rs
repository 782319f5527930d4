use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;
use super::{read_json, write_atomic};

/// JSON array file store.
///
/// Keeps the documents in the same shape as the legacy `data/*.json` files
/// (a pretty-printed array), so existing data directories load unchanged.
pub struct JsonListStore<T> {
    inner: RwLock<Vec<T>>,
    file_path: PathBuf,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    /// Load the array at `path`, creating `[]` when the file is missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let items: Vec<T> = match read_json(&file_path).await? {
            Some(items) => items,
            None => {
                write_atomic(&file_path, b"[]").await?;
                Vec::new()
            }
        };
        Ok(Arc::new(Self { inner: RwLock::new(items), file_path }))
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    pub async fn find<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner.read().await.iter().find(|item| pred(item)).cloned()
    }

    pub async fn filter<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner.read().await.iter().filter(|item| pred(item)).cloned().collect()
    }

    /// Mutate the list and persist it under the write lock. On error (from the
    /// closure or the write) the in-memory list is left as it was.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let mut items = self.inner.write().await;
        let mut next = items.clone();
        let out = f(&mut next)?;
        write_atomic(&self.file_path, &serde_json::to_vec_pretty(&next)?).await?;
        *items = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        label: String,
    }

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_starts_empty_and_persists_pretty() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<Item>::new(&path).await?;
        assert!(store.snapshot().await.is_empty());

        store.update(|items| { items.push(Item { id: 1, label: "one".into() }); Ok(()) }).await?;
        let raw = tokio::fs::read_to_string(&path).await?;
        assert!(raw.starts_with("[\n"));

        let reloaded = JsonListStore::<Item>::new(&path).await?;
        assert_eq!(reloaded.find(|i| i.id == 1).await.map(|i| i.label), Some("one".into()));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<Item>::new(&path).await?;

        let mut handles = Vec::new();
        for id in 0..16u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update(|items| { items.push(Item { id, label: id.to_string() }); Ok(()) }).await
            }));
        }
        for h in handles {
            h.await??;
        }

        let reloaded = JsonListStore::<Item>::new(&path).await?;
        assert_eq!(reloaded.snapshot().await.len(), 16);
        assert_eq!(store.filter(|i| i.id % 2 == 0).await.len(), 8);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
