use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{FollowOutcome, ProfileUpdate, PublicUser, UserProfile, UserRecord, UserSummary};
use super::repository::UserStore;
use crate::auth::Claims;
use crate::errors::ServiceError;
use crate::stories::{Story, StoryFilter, StoryStore};

/// Maximum number of profiles a search returns.
pub const SEARCH_LIMIT: usize = 20;

pub struct UserService {
    users: Arc<dyn UserStore>,
    stories: Arc<dyn StoryStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, stories: Arc<dyn StoryStore>) -> Self { Self { users, stories } }

    async fn require(&self, id: &str) -> Result<UserRecord, ServiceError> {
        self.users.get(id).await?.ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn profile(&self, id: &str) -> Result<UserProfile, ServiceError> {
        Ok(self.require(id).await?.into())
    }

    #[instrument(skip(self, actor, update), fields(actor = %actor.id))]
    pub async fn update_profile(&self, actor: &Claims, id: &str, update: ProfileUpdate) -> Result<PublicUser, ServiceError> {
        if actor.id != id {
            return Err(ServiceError::Forbidden("You can only update your own profile".into()));
        }
        let user = self.users.update_profile(id, update).await?;
        info!(user_id = %user.id, "profile_updated");
        Ok(user.into())
    }

    pub async fn search(&self, query: Option<&str>) -> Result<Vec<UserProfile>, ServiceError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let Some(query) = query else {
            return Err(ServiceError::Validation("Search query is required".into()));
        };
        let found = self.users.search(query, SEARCH_LIMIT).await?;
        Ok(found.into_iter().map(UserProfile::from).collect())
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn follow(&self, actor: &Claims, target_id: &str) -> Result<FollowOutcome, ServiceError> {
        if actor.id == target_id {
            return Err(ServiceError::Validation("You cannot follow yourself".into()));
        }
        let target = self.require(target_id).await?;
        let me = self.require(&actor.id).await?;
        if me.following.iter().any(|id| id == target_id) {
            return Err(ServiceError::Validation("Already following this user".into()));
        }
        let counts = self.users.add_follow(&me.id, &target.id).await?;
        info!(follower = %me.id, followed = %target.id, "user_followed");
        Ok(FollowOutcome { message: "Successfully followed user".into(), counts })
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn unfollow(&self, actor: &Claims, target_id: &str) -> Result<FollowOutcome, ServiceError> {
        let target = self.require(target_id).await?;
        let me = self.require(&actor.id).await?;
        if !me.following.iter().any(|id| id == target_id) {
            return Err(ServiceError::Validation("Not following this user".into()));
        }
        let counts = self.users.remove_follow(&me.id, &target.id).await?;
        info!(follower = %me.id, followed = %target.id, "user_unfollowed");
        Ok(FollowOutcome { message: "Successfully unfollowed user".into(), counts })
    }

    pub async fn followers(&self, id: &str) -> Result<Vec<UserSummary>, ServiceError> {
        let user = self.require(id).await?;
        let list = self.users.get_many(&user.followers).await?;
        Ok(list.into_iter().map(UserSummary::from).collect())
    }

    pub async fn following(&self, id: &str) -> Result<Vec<UserSummary>, ServiceError> {
        let user = self.require(id).await?;
        let list = self.users.get_many(&user.following).await?;
        Ok(list.into_iter().map(UserSummary::from).collect())
    }

    /// Approved stories written by the user, newest first.
    pub async fn stories(&self, id: &str) -> Result<Vec<Story>, ServiceError> {
        let user = self.require(id).await?;
        let filter = StoryFilter { author_id: Some(user.id), ..StoryFilter::approved() };
        self.stories.list(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims_for, file_stores, seed_user};

    #[tokio::test]
    async fn follow_then_unfollow_updates_both_sides() -> anyhow::Result<()> {
        let stores = file_stores().await?;
        let svc = UserService::new(stores.users.clone(), stores.stories.clone());
        let alice = seed_user(&*stores.users, "Alice").await?;
        let bob = seed_user(&*stores.users, "Bob").await?;
        let as_alice = claims_for(&alice);

        let out = svc.follow(&as_alice, &bob.id).await?;
        assert_eq!(out.message, "Successfully followed user");
        assert_eq!((out.counts.followers_count, out.counts.following_count), (1, 1));
        assert_eq!(svc.profile(&bob.id).await?.user.followers, vec![alice.id.clone()]);
        assert_eq!(svc.following(&alice.id).await?[0].name, "Bob");
        assert_eq!(svc.followers(&bob.id).await?[0].name, "Alice");

        let again = svc.follow(&as_alice, &bob.id).await;
        assert!(matches!(again, Err(ServiceError::Validation(m)) if m == "Already following this user"));

        let out = svc.unfollow(&as_alice, &bob.id).await?;
        assert_eq!((out.counts.followers_count, out.counts.following_count), (0, 0));
        assert!(svc.profile(&alice.id).await?.user.following.is_empty());
        let again = svc.unfollow(&as_alice, &bob.id).await;
        assert!(matches!(again, Err(ServiceError::Validation(m)) if m == "Not following this user"));
        Ok(())
    }

    #[tokio::test]
    async fn follow_rejects_self_and_unknown_users() -> anyhow::Result<()> {
        let stores = file_stores().await?;
        let svc = UserService::new(stores.users.clone(), stores.stories.clone());
        let alice = seed_user(&*stores.users, "Alice").await?;
        let as_alice = claims_for(&alice);
        assert!(matches!(svc.follow(&as_alice, &alice.id).await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.follow(&as_alice, "missing").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn only_owner_updates_profile() -> anyhow::Result<()> {
        let stores = file_stores().await?;
        let svc = UserService::new(stores.users.clone(), stores.stories.clone());
        let alice = seed_user(&*stores.users, "Alice").await?;
        let bob = seed_user(&*stores.users, "Bob").await?;
        let update = ProfileUpdate { bio: Some("hi".into()), ..Default::default() };
        assert!(matches!(
            svc.update_profile(&claims_for(&bob), &alice.id, update.clone()).await,
            Err(ServiceError::Forbidden(_))
        ));
        let updated = svc.update_profile(&claims_for(&alice), &alice.id, update).await?;
        assert_eq!(updated.bio, "hi");
        Ok(())
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_requires_query() -> anyhow::Result<()> {
        let stores = file_stores().await?;
        let svc = UserService::new(stores.users.clone(), stores.stories.clone());
        seed_user(&*stores.users, "Maria Lopez").await?;
        seed_user(&*stores.users, "Tom").await?;
        assert_eq!(svc.search(Some("MARIA")).await?.len(), 1);
        assert!(matches!(svc.search(Some("  ")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.search(None).await, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
