use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::storage::{json_list_store::JsonListStore, json_map_store::JsonMapStore};
use crate::stories::{Comment, ReactionKind, ReactionOutcome, ReactionState, Story, StoryFilter, StoryStatus, StoryStore};

/// One user's reactions, each list most recent first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserReactions {
    pub liked: Vec<String>,
    pub felt_this: Vec<String>,
    pub bookmarks: Vec<String>,
}

impl UserReactions {
    fn list(&self, kind: ReactionKind) -> &Vec<String> {
        match kind {
            ReactionKind::Like => &self.liked,
            ReactionKind::FeltThis => &self.felt_this,
            ReactionKind::Bookmark => &self.bookmarks,
        }
    }

    fn list_mut(&mut self, kind: ReactionKind) -> &mut Vec<String> {
        match kind {
            ReactionKind::Like => &mut self.liked,
            ReactionKind::FeltThis => &mut self.felt_this,
            ReactionKind::Bookmark => &mut self.bookmarks,
        }
    }

    fn has(&self, kind: ReactionKind, story_id: &str) -> bool {
        self.list(kind).iter().any(|id| id == story_id)
    }

    fn forget(&mut self, story_id: &str) {
        for kind in [ReactionKind::Like, ReactionKind::FeltThis, ReactionKind::Bookmark] {
            self.list_mut(kind).retain(|id| id != story_id);
        }
    }
}

/// Stories in `stories.json` (newest first), comments in `comments.json`,
/// per-user reactions in `reactions.json`.
pub struct FileStoryStore {
    stories: Arc<JsonListStore<Story>>,
    comments: Arc<JsonListStore<Comment>>,
    reactions: Arc<JsonMapStore<String, UserReactions>>,
}

impl FileStoryStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Arc<Self>, ServiceError> {
        let dir = data_dir.as_ref();
        Ok(Arc::new(Self {
            stories: JsonListStore::new(dir.join("stories.json")).await?,
            comments: JsonListStore::new(dir.join("comments.json")).await?,
            reactions: JsonMapStore::new(dir.join("reactions.json")).await?,
        }))
    }

    async fn with_story<R, F>(&self, id: &str, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Story) -> R + Send,
    {
        self.stories
            .update(|stories| {
                let story = stories.iter_mut().find(|s| s.id == id).ok_or_else(|| ServiceError::not_found("Story"))?;
                Ok(f(story))
            })
            .await
    }
}

fn newest_first(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl StoryStore for FileStoryStore {
    async fn list(&self, filter: &StoryFilter) -> Result<Vec<Story>, ServiceError> {
        let mut found = self.stories.filter(|s| filter.matches(s)).await;
        newest_first(&mut found);
        Ok(found)
    }

    async fn get(&self, id: &str) -> Result<Option<Story>, ServiceError> {
        Ok(self.stories.find(|s| s.id == id).await)
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Story>, ServiceError> {
        let all = self.stories.snapshot().await;
        Ok(ids.iter().filter_map(|id| all.iter().find(|s| &s.id == id).cloned()).collect())
    }

    async fn insert_many(&self, new: Vec<Story>) -> Result<(), ServiceError> {
        self.stories
            .update(|stories| {
                // newest at the front, like the legacy file
                for story in new {
                    stories.insert(0, story);
                }
                Ok(())
            })
            .await
    }

    async fn upsert(&self, story: Story) -> Result<(), ServiceError> {
        self.stories
            .update(|stories| {
                match stories.iter_mut().find(|s| s.id == story.id) {
                    Some(existing) => *existing = story,
                    None => stories.push(story),
                }
                Ok(())
            })
            .await
    }

    async fn replace(&self, story: Story) -> Result<Story, ServiceError> {
        let id = story.id.clone();
        self.with_story(&id, move |existing| {
            // counters and status only move through their own operations
            let Story { likes, comments, felt_this_count, status, created_at, .. } = *existing;
            *existing = Story { likes, comments, felt_this_count, status, created_at, ..story };
            existing.clone()
        })
        .await
    }

    async fn set_status(&self, id: &str, status: StoryStatus) -> Result<Story, ServiceError> {
        self.with_story(id, |story| {
            story.status = status;
            story.clone()
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let existed = self
            .stories
            .update(|stories| {
                let before = stories.len();
                stories.retain(|s| s.id != id);
                Ok(stories.len() != before)
            })
            .await?;
        if existed {
            self.comments.update(|comments| { comments.retain(|c| c.story_id != id); Ok(()) }).await?;
            self.reactions.update_map(|map| { map.values_mut().for_each(|r| r.forget(id)); Ok(()) }).await?;
        }
        Ok(existed)
    }

    async fn toggle_reaction(&self, story_id: &str, user_id: &str, kind: ReactionKind) -> Result<ReactionOutcome, ServiceError> {
        let active = self
            .reactions
            .update_map(|map| {
                let list = map.entry(user_id.to_string()).or_default().list_mut(kind);
                match list.iter().position(|id| id == story_id) {
                    Some(pos) => {
                        list.remove(pos);
                        Ok(false)
                    }
                    None => {
                        list.insert(0, story_id.to_string());
                        Ok(true)
                    }
                }
            })
            .await?;
        // the counter lives in stories.json under its own lock; the story may be gone by now
        let counted = match kind {
            ReactionKind::Bookmark => match self.get(story_id).await {
                Ok(Some(_)) => Ok(0),
                Ok(None) => Err(ServiceError::not_found("Story")),
                Err(e) => Err(e),
            },
            _ => self.with_story(story_id, |story| story.bump(kind, active)).await,
        };
        match counted {
            Ok(count) => Ok(ReactionOutcome { active, count }),
            Err(e) => {
                let missing = matches!(e, ServiceError::NotFound(_));
                self.reactions
                    .update_map(|map| {
                        if let Some(mine) = map.get_mut(user_id) {
                            let list = mine.list_mut(kind);
                            list.retain(|id| id != story_id);
                            if !missing && !active {
                                list.insert(0, story_id.to_string());
                            }
                        }
                        Ok(())
                    })
                    .await?;
                Err(e)
            }
        }
    }

    async fn reaction_state(&self, story_id: &str, user_id: &str) -> Result<ReactionState, ServiceError> {
        let mine = self.reactions.get(&user_id.to_string()).await.unwrap_or_default();
        Ok(ReactionState {
            liked: mine.has(ReactionKind::Like, story_id),
            felt_this: mine.has(ReactionKind::FeltThis, story_id),
            bookmarked: mine.has(ReactionKind::Bookmark, story_id),
        })
    }

    async fn reacted_story_ids(&self, user_id: &str, kind: ReactionKind) -> Result<Vec<String>, ServiceError> {
        Ok(self.reactions.get(&user_id.to_string()).await.map(|r| r.list(kind).clone()).unwrap_or_default())
    }

    async fn add_comment(&self, comment: Comment) -> Result<Comment, ServiceError> {
        self.with_story(&comment.story_id, |story| story.comments = story.comments.saturating_add(1)).await?;
        self.comments
            .update(|comments| {
                comments.push(comment.clone());
                Ok(comment)
            })
            .await
    }

    async fn comments(&self, story_id: &str) -> Result<Vec<Comment>, ServiceError> {
        let mut found = self.comments.filter(|c| c.story_id == story_id).await;
        found.reverse();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}
