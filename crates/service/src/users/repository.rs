use async_trait::async_trait;

use super::domain::{FollowCounts, ProfileUpdate, UserRecord};
use crate::errors::ServiceError;

/// Persistence for users and follow edges.
///
/// Implemented by `file::FileUserStore` and `db::DbUserStore`. Records come
/// back with `followers`/`following` filled in, whichever way the backend
/// stores the edges.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<UserRecord>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ServiceError>;
    /// Lookup preserving the order of `ids`; unknown ids are skipped.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, ServiceError>;
    /// Insert a new user; `Conflict("Email already exists")` on a duplicate email.
    async fn create(&self, user: UserRecord) -> Result<UserRecord, ServiceError>;
    /// Insert or overwrite the profile by id. Follow edges in `user` are ignored;
    /// existing edges stay and the importer adds new ones through `add_follow`.
    async fn upsert(&self, user: UserRecord) -> Result<(), ServiceError>;
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<UserRecord, ServiceError>;
    async fn set_password(&self, id: &str, password_hash: String) -> Result<(), ServiceError>;
    /// Case-insensitive substring match on name or email.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<UserRecord>, ServiceError>;
    /// Record `follower -> followed` on both sides; idempotent.
    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError>;
    /// Remove the edge on both sides; idempotent.
    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError>;
}
