use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{Comment, ReactionKind, ReactionOutcome, ReactionState, Story, StoryFilter, StoryInput, StoryStatus, StoryUpdate};
use super::repository::StoryStore;
use crate::auth::Claims;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::users::{Role, UserStore};

/// Publishing rules for new stories.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoryPolicy {
    /// New stories wait in `pending` for an admin instead of going live.
    pub require_moderation: bool,
}

impl StoryPolicy {
    fn initial_status(self) -> StoryStatus {
        if self.require_moderation { StoryStatus::Pending } else { StoryStatus::Approved }
    }
}

pub struct StoryService {
    stories: Arc<dyn StoryStore>,
    users: Arc<dyn UserStore>,
    policy: StoryPolicy,
}

impl StoryService {
    pub fn new(stories: Arc<dyn StoryStore>, users: Arc<dyn UserStore>, policy: StoryPolicy) -> Self {
        Self { stories, users, policy }
    }

    async fn require(&self, id: &str) -> Result<Story, ServiceError> {
        self.stories.get(id).await?.ok_or_else(|| ServiceError::not_found("Story"))
    }

    async fn is_admin(&self, user_id: &str) -> Result<bool, ServiceError> {
        Ok(self.users.get(user_id).await?.is_some_and(|u| u.role == Role::Admin))
    }

    /// Author check: `authorId` when present; legacy stories without one match on the display name.
    fn is_author(actor: &Claims, story: &Story) -> bool {
        match &story.author_id {
            Some(author_id) => *author_id == actor.id,
            None => story.author == actor.name,
        }
    }

    async fn can_modify(&self, actor: &Claims, story: &Story) -> Result<bool, ServiceError> {
        Ok(Self::is_author(actor, story) || self.is_admin(&actor.id).await?)
    }

    /// Approved stories, newest first, optionally narrowed and paginated.
    pub async fn list_public(&self, mut filter: StoryFilter, page: Option<Pagination>) -> Result<Vec<Story>, ServiceError> {
        filter.status = Some(StoryStatus::Approved);
        let stories = self.stories.list(&filter).await?;
        Ok(match page {
            Some(page) => {
                let (idx, per_page) = page.normalize();
                stories.into_iter().skip((idx * per_page) as usize).take(per_page as usize).collect()
            }
            None => stories,
        })
    }

    /// A single story as the public sees it; anything not approved is hidden.
    pub async fn get_public(&self, id: &str) -> Result<Story, ServiceError> {
        let story = self.require(id).await?;
        if story.status != StoryStatus::Approved {
            return Err(ServiceError::not_found("Story"));
        }
        Ok(story)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.id))]
    pub async fn create(&self, actor: &Claims, input: StoryInput) -> Result<Story, ServiceError> {
        let story = input.into_story(&actor.id, &actor.name, self.policy.initial_status());
        self.stories.insert_many(vec![story.clone()]).await?;
        info!(story_id = %story.id, status = %story.status, "story_created");
        Ok(story)
    }

    #[instrument(skip(self, actor, inputs), fields(actor = %actor.id, count = inputs.len()))]
    pub async fn create_many(&self, actor: &Claims, inputs: Vec<StoryInput>) -> Result<Vec<Story>, ServiceError> {
        let status = self.policy.initial_status();
        let stories: Vec<Story> = inputs.into_iter().map(|i| i.into_story(&actor.id, &actor.name, status)).collect();
        self.stories.insert_many(stories.clone()).await?;
        info!(count = stories.len(), "stories_created");
        Ok(stories)
    }

    #[instrument(skip(self, actor, update), fields(actor = %actor.id))]
    pub async fn update(&self, actor: &Claims, id: &str, update: StoryUpdate) -> Result<Story, ServiceError> {
        let mut story = self.require(id).await?;
        if !self.can_modify(actor, &story).await? {
            return Err(ServiceError::Forbidden("Not authorized to edit this story".into()));
        }
        update.apply(&mut story);
        let story = self.stories.replace(story).await?;
        info!(story_id = %story.id, "story_updated");
        Ok(story)
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete(&self, actor: &Claims, id: &str) -> Result<(), ServiceError> {
        let story = self.require(id).await?;
        if !self.can_modify(actor, &story).await? {
            return Err(ServiceError::Forbidden("Not authorized to delete this story".into()));
        }
        if !self.stories.delete(id).await? {
            return Err(ServiceError::not_found("Story"));
        }
        info!(story_id = %id, "story_deleted");
        Ok(())
    }

    /// Every story regardless of status, for moderators.
    pub async fn list_all(&self) -> Result<Vec<Story>, ServiceError> {
        self.stories.list(&StoryFilter::default()).await
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: &str, status: &str) -> Result<Story, ServiceError> {
        let status: StoryStatus = status.parse()?;
        let story = self.stories.set_status(id, status).await?;
        info!(story_id = %story.id, status = %story.status, "story_status_changed");
        Ok(story)
    }

    pub async fn toggle_reaction(&self, actor: &Claims, id: &str, kind: ReactionKind) -> Result<ReactionOutcome, ServiceError> {
        self.require(id).await?;
        let out = self.stories.toggle_reaction(id, &actor.id, kind).await?;
        info!(story_id = %id, user_id = %actor.id, kind = kind.as_str(), active = out.active, "reaction_toggled");
        Ok(out)
    }

    pub async fn reactions(&self, actor: &Claims, id: &str) -> Result<ReactionState, ServiceError> {
        self.require(id).await?;
        self.stories.reaction_state(id, &actor.id).await
    }

    /// The caller's bookmarked stories that are still visible, most recently bookmarked first.
    pub async fn bookmarks(&self, actor: &Claims) -> Result<Vec<Story>, ServiceError> {
        let ids = self.stories.reacted_story_ids(&actor.id, ReactionKind::Bookmark).await?;
        let stories = self.stories.get_many(&ids).await?;
        Ok(stories.into_iter().filter(|s| s.status == StoryStatus::Approved).collect())
    }

    pub async fn comments(&self, id: &str) -> Result<Vec<Comment>, ServiceError> {
        self.require(id).await?;
        self.stories.comments(id).await
    }

    #[instrument(skip(self, actor, text), fields(actor = %actor.id))]
    pub async fn add_comment(&self, actor: &Claims, id: &str, text: &str) -> Result<Comment, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation("Comment text is required".into()));
        }
        self.require(id).await?;
        let comment = self.stories.add_comment(Comment::new(id, &actor.id, &actor.name, text.to_string())).await?;
        info!(story_id = %id, comment_id = %comment.id, "comment_added");
        Ok(comment)
    }
}
