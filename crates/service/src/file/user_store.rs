use std::{path::Path, sync::Arc};

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::storage::json_list_store::JsonListStore;
use crate::users::{FollowCounts, ProfileUpdate, UserRecord, UserStore};

/// Users persisted as the legacy `users.json` array; follow edges live on
/// both records (`followers` / `following`).
pub struct FileUserStore {
    users: Arc<JsonListStore<UserRecord>>,
}

impl FileUserStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Arc<Self>, ServiceError> {
        let users = JsonListStore::new(data_dir.as_ref().join("users.json")).await?;
        Ok(Arc::new(Self { users }))
    }
}

fn position(users: &[UserRecord], id: &str) -> Result<usize, ServiceError> {
    users.iter().position(|u| u.id == id).ok_or_else(|| ServiceError::not_found("User"))
}

fn counts(users: &[UserRecord], follower: usize, followed: usize) -> FollowCounts {
    FollowCounts { followers_count: users[followed].followers.len(), following_count: users[follower].following.len() }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn get(&self, id: &str) -> Result<Option<UserRecord>, ServiceError> {
        Ok(self.users.find(|u| u.id == id).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ServiceError> {
        Ok(self.users.find(|u| u.email == email).await)
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, ServiceError> {
        let all = self.users.snapshot().await;
        Ok(ids.iter().filter_map(|id| all.iter().find(|u| &u.id == id).cloned()).collect())
    }

    async fn create(&self, user: UserRecord) -> Result<UserRecord, ServiceError> {
        self.users
            .update(|users| {
                if users.iter().any(|u| u.email == user.email) {
                    return Err(ServiceError::Conflict("Email already exists".into()));
                }
                users.push(user.clone());
                Ok(user)
            })
            .await
    }

    async fn upsert(&self, mut user: UserRecord) -> Result<(), ServiceError> {
        self.users
            .update(|users| {
                match users.iter_mut().find(|u| u.id == user.id) {
                    Some(existing) => {
                        user.followers = std::mem::take(&mut existing.followers);
                        user.following = std::mem::take(&mut existing.following);
                        *existing = user;
                    }
                    None => {
                        user.followers.clear();
                        user.following.clear();
                        users.push(user);
                    }
                }
                Ok(())
            })
            .await
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<UserRecord, ServiceError> {
        self.users
            .update(|users| {
                let idx = position(users, id)?;
                update.apply(&mut users[idx]);
                Ok(users[idx].clone())
            })
            .await
    }

    async fn set_password(&self, id: &str, password_hash: String) -> Result<(), ServiceError> {
        self.users
            .update(|users| {
                let idx = position(users, id)?;
                users[idx].password_hash = password_hash;
                Ok(())
            })
            .await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<UserRecord>, ServiceError> {
        let needle = query.to_lowercase();
        let mut found = self
            .users
            .filter(|u| u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle))
            .await;
        found.truncate(limit);
        Ok(found)
    }

    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError> {
        self.users
            .update(|users| {
                let follower = position(users, follower_id)?;
                let followed = position(users, followed_id)?;
                if !users[follower].following.iter().any(|id| id == followed_id) {
                    users[follower].following.push(followed_id.to_string());
                }
                if !users[followed].followers.iter().any(|id| id == follower_id) {
                    users[followed].followers.push(follower_id.to_string());
                }
                Ok(counts(users, follower, followed))
            })
            .await
    }

    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError> {
        self.users
            .update(|users| {
                let follower = position(users, follower_id)?;
                let followed = position(users, followed_id)?;
                users[follower].following.retain(|id| id != followed_id);
                users[followed].followers.retain(|id| id != follower_id);
                Ok(counts(users, follower, followed))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("file_user_store_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> anyhow::Result<()> {
        let store = FileUserStore::open(tmp_dir()).await?;
        store.create(UserRecord::new("A", "a@example.com", "h".into())).await?;
        let dup = store.create(UserRecord::new("B", "a@example.com", "h".into())).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn reads_legacy_users_file() -> anyhow::Result<()> {
        let dir = tmp_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(
            dir.join("users.json"),
            r#"[{"id":"1700000000000","name":"Old Timer","email":"old@example.com","password":"$2b$10$x",
                "bio":"","avatar":"","location":"","website":"","joinedDate":"2024-01-01T00:00:00.000Z",
                "role":"admin","followers":[],"following":["2"]}]"#,
        )
        .await?;
        let store = FileUserStore::open(&dir).await?;
        let user = store.find_by_email("old@example.com").await?.unwrap();
        assert_eq!(user.id, "1700000000000");
        assert_eq!(user.following, vec!["2".to_string()]);
        assert_eq!(store.get_many(&["missing".into(), user.id.clone()]).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn follow_edges_are_idempotent() -> anyhow::Result<()> {
        let store = FileUserStore::open(tmp_dir()).await?;
        let a = store.create(UserRecord::new("A", "a@example.com", "h".into())).await?;
        let b = store.create(UserRecord::new("B", "b@example.com", "h".into())).await?;
        store.add_follow(&a.id, &b.id).await?;
        let counts = store.add_follow(&a.id, &b.id).await?;
        assert_eq!(counts, FollowCounts { followers_count: 1, following_count: 1 });
        let counts = store.remove_follow(&a.id, &b.id).await?;
        assert_eq!(counts, FollowCounts { followers_count: 0, following_count: 0 });
        assert!(matches!(store.add_follow(&a.id, "ghost").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
