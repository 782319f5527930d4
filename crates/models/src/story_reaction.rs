use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

pub const KIND_LIKE: &str = "like";
pub const KIND_FELT_THIS: &str = "felt_this";
pub const KIND_BOOKMARK: &str = "bookmark";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "story_reactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub story_id: String,
    pub user_id: String,
    pub kind: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Story }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Story => Entity::belongs_to(crate::story::Entity)
                .from(Column::StoryId)
                .to(crate::story::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::story::Entity> for Entity {
    fn to() -> RelationDef { Relation::Story.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_kind(kind: &str) -> Result<(), errors::ModelError> {
    if ![KIND_LIKE, KIND_FELT_THIS, KIND_BOOKMARK].contains(&kind) {
        return Err(errors::ModelError::Validation(format!("invalid reaction kind `{kind}`")));
    }
    Ok(())
}

pub async fn find<C: ConnectionTrait>(db: &C, story_id: &str, user_id: &str, kind: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::StoryId.eq(story_id))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Kind.eq(kind))
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(db: &C, story_id: &str, user_id: &str, kind: &str) -> Result<Model, errors::ModelError> {
    validate_kind(kind)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        story_id: Set(story_id.to_string()),
        user_id: Set(user_id.to_string()),
        kind: Set(kind.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

/// Story ids a user reacted to with `kind`, most recent first.
pub async fn story_ids_for_user<C: ConnectionTrait>(db: &C, user_id: &str, kind: &str) -> Result<Vec<String>, errors::ModelError> {
    use sea_orm::QueryOrder;
    let rows = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Kind.eq(kind))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.story_id).collect())
}
