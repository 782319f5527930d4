use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub story_id: String,
    pub author_id: String,
    pub author: String,
    pub text: String,
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

/// Comments of a story, newest first.
pub async fn list_for_story<C: ConnectionTrait>(db: &C, story_id: &str) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::StoryId.eq(story_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}
