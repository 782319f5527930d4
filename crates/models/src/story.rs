use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub author_id: Option<String>,
    pub author: String,
    pub author_initials: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: Option<String>,
    pub circle: Option<String>,
    pub images: Json,
    pub location: Option<Json>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub language: Option<String>,
    pub profile_image: Option<String>,
    pub context: Option<String>,
    pub is_anonymous: bool,
    pub has_audio: bool,
    pub has_video: bool,
    pub status: String,
    pub likes: i32,
    pub comments: i32,
    pub felt_this_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Author,
    Comment,
    Reaction,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Author => Entity::belongs_to(crate::user::Entity)
                .from(Column::AuthorId)
                .to(crate::user::Column::Id)
                .into(),
            Relation::Comment => Entity::has_many(crate::comment::Entity).into(),
            Relation::Reaction => Entity::has_many(crate::story_reaction::Entity).into(),
        }
    }
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Author.def() }
}

impl Related<crate::comment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Comment.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

pub fn validate_status(status: &str) -> Result<(), errors::ModelError> {
    if !STATUSES.contains(&status) {
        return Err(errors::ModelError::Validation(format!("invalid story status `{status}`")));
    }
    Ok(())
}

/// Counter columns adjusted by comments and reactions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Comments,
    FeltThis,
}

/// Add `delta` to a counter (never below zero) and return the new value.
/// Callers run this inside the transaction that inserted/deleted the reaction row.
pub async fn bump_counter<C: ConnectionTrait>(db: &C, id: &str, counter: Counter, delta: i32) -> Result<i32, errors::ModelError> {
    let found = Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::Validation("story not found".into()))?;
    let current = match counter {
        Counter::Likes => found.likes,
        Counter::Comments => found.comments,
        Counter::FeltThis => found.felt_this_count,
    };
    let next = (current + delta).max(0);
    let mut am: ActiveModel = found.into();
    match counter {
        Counter::Likes => am.likes = Set(next),
        Counter::Comments => am.comments = Set(next),
        Counter::FeltThis => am.felt_this_count = Set(next),
    }
    am.update(db).await?;
    Ok(next)
}

pub async fn set_status<C: ConnectionTrait>(db: &C, id: &str, status: &str) -> Result<Model, errors::ModelError> {
    validate_status(status)?;
    let mut found: ActiveModel = Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::Validation("story not found".into()))?
        .into();
    found.status = Set(status.to_string());
    Ok(found.update(db).await?)
}
