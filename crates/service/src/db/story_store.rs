use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use models::{comment, story, story_reaction};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::warn;

use crate::errors::ServiceError;
use crate::stories::{Comment, ReactionKind, ReactionOutcome, ReactionState, Story, StoryFilter, StoryStatus, StoryStore};

/// Stories in `stories`, comments in `comments`, reactions in `story_reactions`.
/// Counter changes run in the same transaction as the row they count.
pub struct DbStoryStore {
    db: DatabaseConnection,
}

impl DbStoryStore {
    pub fn new(db: DatabaseConnection) -> Arc<Self> { Arc::new(Self { db }) }
}

fn to_story(m: story::Model) -> Story {
    let images = serde_json::from_value(m.images).unwrap_or_default();
    let location = m.location.and_then(|l| serde_json::from_value(l).ok());
    let status = m.status.parse().unwrap_or_else(|_| {
        warn!(story_id = %m.id, status = %m.status, "unknown story status, treating as pending");
        StoryStatus::Pending
    });
    Story {
        id: m.id,
        author_id: m.author_id,
        title: m.title,
        excerpt: m.excerpt,
        content: m.content,
        author: m.author,
        author_initials: m.author_initials,
        category: m.category.and_then(|c| c.parse().ok()),
        images,
        likes: m.likes.max(0) as u32,
        comments: m.comments.max(0) as u32,
        felt_this_count: m.felt_this_count.max(0) as u32,
        is_anonymous: m.is_anonymous,
        has_audio: m.has_audio,
        has_video: m.has_video,
        location,
        circle: m.circle,
        audio_url: m.audio_url,
        video_url: m.video_url,
        language: m.language,
        profile_image: m.profile_image,
        context: m.context,
        status,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

/// Copy the editable fields onto an active model.
fn set_content(am: &mut story::ActiveModel, s: &Story) -> Result<(), ServiceError> {
    am.author_id = Set(s.author_id.clone());
    am.author = Set(s.author.clone());
    am.author_initials = Set(s.author_initials.clone());
    am.title = Set(s.title.clone());
    am.excerpt = Set(s.excerpt.clone());
    am.content = Set(s.content.clone());
    am.category = Set(s.category.map(|c| c.as_str().to_string()));
    am.circle = Set(s.circle.clone());
    am.images = Set(serde_json::to_value(&s.images)?);
    am.location = Set(s.location.as_ref().map(serde_json::to_value).transpose()?);
    am.audio_url = Set(s.audio_url.clone());
    am.video_url = Set(s.video_url.clone());
    am.language = Set(s.language.clone());
    am.profile_image = Set(s.profile_image.clone());
    am.context = Set(s.context.clone());
    am.is_anonymous = Set(s.is_anonymous);
    am.has_audio = Set(s.has_audio);
    am.has_video = Set(s.has_video);
    Ok(())
}

fn to_active(s: &Story) -> Result<story::ActiveModel, ServiceError> {
    let mut am = story::ActiveModel {
        id: Set(s.id.clone()),
        status: Set(s.status.as_str().to_string()),
        likes: Set(s.likes as i32),
        comments: Set(s.comments as i32),
        felt_this_count: Set(s.felt_this_count as i32),
        created_at: Set(s.created_at.into()),
        ..Default::default()
    };
    set_content(&mut am, s)?;
    Ok(am)
}

fn to_comment(m: comment::Model) -> Comment {
    Comment {
        id: m.id,
        story_id: m.story_id,
        author_id: m.author_id,
        author: m.author,
        text: m.text,
        created_at: m.created_at.with_timezone(&Utc),
    }
}

fn counter_for(kind: ReactionKind) -> Option<story::Counter> {
    match kind {
        ReactionKind::Like => Some(story::Counter::Likes),
        ReactionKind::FeltThis => Some(story::Counter::FeltThis),
        ReactionKind::Bookmark => None,
    }
}

#[async_trait]
impl StoryStore for DbStoryStore {
    async fn list(&self, filter: &StoryFilter) -> Result<Vec<Story>, ServiceError> {
        let mut q = story::Entity::find();
        if let Some(status) = filter.status {
            q = q.filter(story::Column::Status.eq(status.as_str()));
        }
        if let Some(circle) = &filter.circle {
            q = q.filter(story::Column::Circle.eq(circle.as_str()));
        }
        if let Some(category) = filter.category {
            q = q.filter(story::Column::Category.eq(category.as_str()));
        }
        if let Some(author_id) = &filter.author_id {
            q = q.filter(story::Column::AuthorId.eq(author_id.as_str()));
        }
        let rows = q.order_by_desc(story::Column::CreatedAt).all(&self.db).await?;
        Ok(rows.into_iter().map(to_story).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Story>, ServiceError> {
        Ok(story::Entity::find_by_id(id.to_string()).one(&self.db).await?.map(to_story))
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<Story>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = story::Entity::find().filter(story::Column::Id.is_in(ids.to_vec())).all(&self.db).await?;
        Ok(ids
            .iter()
            .filter_map(|id| rows.iter().find(|m| &m.id == id).cloned().map(to_story))
            .collect())
    }

    async fn insert_many(&self, stories: Vec<Story>) -> Result<(), ServiceError> {
        if stories.is_empty() {
            return Ok(());
        }
        let models = stories.iter().map(to_active).collect::<Result<Vec<_>, _>>()?;
        story::Entity::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    async fn upsert(&self, s: Story) -> Result<(), ServiceError> {
        story::Entity::insert(to_active(&s)?)
            .on_conflict(
                OnConflict::column(story::Column::Id)
                    .update_columns([
                        story::Column::AuthorId,
                        story::Column::Author,
                        story::Column::AuthorInitials,
                        story::Column::Title,
                        story::Column::Excerpt,
                        story::Column::Content,
                        story::Column::Category,
                        story::Column::Circle,
                        story::Column::Images,
                        story::Column::Location,
                        story::Column::AudioUrl,
                        story::Column::VideoUrl,
                        story::Column::Language,
                        story::Column::ProfileImage,
                        story::Column::Context,
                        story::Column::IsAnonymous,
                        story::Column::HasAudio,
                        story::Column::HasVideo,
                        story::Column::Status,
                        story::Column::Likes,
                        story::Column::Comments,
                        story::Column::FeltThisCount,
                        story::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn replace(&self, s: Story) -> Result<Story, ServiceError> {
        let existing = story::Entity::find_by_id(s.id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Story"))?;
        let mut am: story::ActiveModel = existing.into();
        set_content(&mut am, &s)?;
        Ok(to_story(am.update(&self.db).await?))
    }

    async fn set_status(&self, id: &str, status: StoryStatus) -> Result<Story, ServiceError> {
        if self.get(id).await?.is_none() {
            return Err(ServiceError::not_found("Story"));
        }
        Ok(to_story(story::set_status(&self.db, id, status.as_str()).await?))
    }

    async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        // comments and reactions go with it through ON DELETE CASCADE
        let res = story::Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn toggle_reaction(&self, story_id: &str, user_id: &str, kind: ReactionKind) -> Result<ReactionOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        if story::Entity::find_by_id(story_id.to_string()).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("Story"));
        }
        let active = match story_reaction::find(&txn, story_id, user_id, kind.as_str()).await? {
            Some(existing) => {
                story_reaction::Entity::delete_by_id(existing.id).exec(&txn).await?;
                false
            }
            None => {
                story_reaction::create(&txn, story_id, user_id, kind.as_str()).await?;
                true
            }
        };
        let count = match counter_for(kind) {
            Some(counter) => story::bump_counter(&txn, story_id, counter, if active { 1 } else { -1 }).await?,
            None => 0,
        };
        txn.commit().await?;
        Ok(ReactionOutcome { active, count: count.max(0) as u32 })
    }

    async fn reaction_state(&self, story_id: &str, user_id: &str) -> Result<ReactionState, ServiceError> {
        let rows = story_reaction::Entity::find()
            .filter(story_reaction::Column::StoryId.eq(story_id))
            .filter(story_reaction::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        let has = |kind: ReactionKind| rows.iter().any(|r| r.kind == kind.as_str());
        Ok(ReactionState {
            liked: has(ReactionKind::Like),
            felt_this: has(ReactionKind::FeltThis),
            bookmarked: has(ReactionKind::Bookmark),
        })
    }

    async fn reacted_story_ids(&self, user_id: &str, kind: ReactionKind) -> Result<Vec<String>, ServiceError> {
        Ok(story_reaction::story_ids_for_user(&self.db, user_id, kind.as_str()).await?)
    }

    async fn add_comment(&self, c: Comment) -> Result<Comment, ServiceError> {
        let txn = self.db.begin().await?;
        if story::Entity::find_by_id(c.story_id.clone()).one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("Story"));
        }
        let saved = comment::ActiveModel {
            id: Set(c.id.clone()),
            story_id: Set(c.story_id.clone()),
            author_id: Set(c.author_id.clone()),
            author: Set(c.author.clone()),
            text: Set(c.text.clone()),
            created_at: Set(c.created_at.into()),
        }
        .insert(&txn)
        .await?;
        story::bump_counter(&txn, &c.story_id, story::Counter::Comments, 1).await?;
        txn.commit().await?;
        Ok(to_comment(saved))
    }

    async fn comments(&self, story_id: &str) -> Result<Vec<Comment>, ServiceError> {
        Ok(comment::list_for_story(&self.db, story_id).await?.into_iter().map(to_comment).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbUserStore;
    use crate::stories::StoryInput;
    use crate::test_support::get_db;
    use crate::users::{UserRecord, UserStore};

    #[tokio::test]
    async fn reactions_and_comments_update_counters() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let users = DbUserStore::new(db.clone());
        let store = DbStoryStore::new(db.clone());
        let tag = uuid::Uuid::new_v4().simple().to_string();
        let author = users.create(UserRecord::new("Author", format!("author-{tag}@example.com"), "h".into())).await?;

        let mut s = StoryInput { title: "Kitchen radio".into(), image: Some("/r.jpg".into()), ..Default::default() }
            .into_story(&author.id, &author.name, StoryStatus::Pending);
        s.circle = Some("rhythms-of-home".into());
        store.insert_many(vec![s.clone()]).await?;

        let got = store.get(&s.id).await?.unwrap();
        assert_eq!(got.images, vec!["/r.jpg".to_string()]);
        assert_eq!(got.status, StoryStatus::Pending);

        assert_eq!(store.toggle_reaction(&s.id, &author.id, ReactionKind::Like).await?, ReactionOutcome { active: true, count: 1 });
        assert_eq!(store.toggle_reaction(&s.id, &author.id, ReactionKind::Like).await?, ReactionOutcome { active: false, count: 0 });
        store.toggle_reaction(&s.id, &author.id, ReactionKind::Bookmark).await?;
        assert!(store.reaction_state(&s.id, &author.id).await?.bookmarked);

        store.add_comment(Comment::new(&s.id, &author.id, "Author", "so true".into())).await?;
        assert_eq!(store.get(&s.id).await?.map(|s| s.comments), Some(1));

        assert!(store.delete(&s.id).await?);
        assert!(store.comments(&s.id).await?.is_empty());
        assert!(store.reacted_story_ids(&author.id, ReactionKind::Bookmark).await?.is_empty());
        models::user::Entity::delete_by_id(author.id).exec(&db).await?;
        Ok(())
    }
}
