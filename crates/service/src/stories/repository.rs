use async_trait::async_trait;

use super::domain::{Comment, ReactionKind, ReactionOutcome, ReactionState, Story, StoryFilter, StoryStatus};
use crate::errors::ServiceError;

/// Persistence for stories and everything hanging off them.
///
/// Operations on a missing story return `NotFound("Story not found")`, except
/// `get` and `delete` which report absence through their return value.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Matching stories, newest first.
    async fn list(&self, filter: &StoryFilter) -> Result<Vec<Story>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<Story>, ServiceError>;
    /// Stories by id, in the order given; unknown ids are skipped.
    async fn get_many(&self, ids: &[String]) -> Result<Vec<Story>, ServiceError>;
    async fn insert_many(&self, stories: Vec<Story>) -> Result<(), ServiceError>;
    /// Insert or overwrite by id. Used by the importer.
    async fn upsert(&self, story: Story) -> Result<(), ServiceError>;
    /// Overwrite the editable fields of an existing story.
    async fn replace(&self, story: Story) -> Result<Story, ServiceError>;
    async fn set_status(&self, id: &str, status: StoryStatus) -> Result<Story, ServiceError>;
    /// Delete a story with its comments and reactions; false when it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;

    /// Flip the user's reaction and adjust the matching counter.
    async fn toggle_reaction(&self, story_id: &str, user_id: &str, kind: ReactionKind) -> Result<ReactionOutcome, ServiceError>;
    async fn reaction_state(&self, story_id: &str, user_id: &str) -> Result<ReactionState, ServiceError>;
    /// Story ids the user reacted to with `kind`, most recent first.
    async fn reacted_story_ids(&self, user_id: &str, kind: ReactionKind) -> Result<Vec<String>, ServiceError>;

    /// Store a comment and increment the story's comment counter.
    async fn add_comment(&self, comment: Comment) -> Result<Comment, ServiceError>;
    /// Comments of a story, newest first.
    async fn comments(&self, story_id: &str) -> Result<Vec<Comment>, ServiceError>;
}
