use sea_orm::{entity::prelude::*, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub follower_id: String,
    pub followed_id: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Follower,
    Followed,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Follower => Entity::belongs_to(crate::user::Entity)
                .from(Column::FollowerId)
                .to(crate::user::Column::Id)
                .into(),
            Relation::Followed => Entity::belongs_to(crate::user::Entity)
                .from(Column::FollowedId)
                .to(crate::user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn exists<C: ConnectionTrait>(db: &C, follower_id: &str, followed_id: &str) -> Result<bool, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::FollowerId.eq(follower_id))
        .filter(Column::FollowedId.eq(followed_id))
        .one(db)
        .await?;
    Ok(found.is_some())
}

pub async fn create<C: ConnectionTrait>(db: &C, follower_id: &str, followed_id: &str) -> Result<Model, errors::ModelError> {
    if follower_id == followed_id {
        return Err(errors::ModelError::Validation("cannot follow self".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        follower_id: Set(follower_id.to_string()),
        followed_id: Set(followed_id.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

/// Delete the edge; returns whether it existed.
pub async fn delete_pair<C: ConnectionTrait>(db: &C, follower_id: &str, followed_id: &str) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::FollowerId.eq(follower_id))
        .filter(Column::FollowedId.eq(followed_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

/// Ids of users following `user_id`, oldest edge first.
pub async fn follower_ids<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Vec<String>, errors::ModelError> {
    let rows = Entity::find()
        .filter(Column::FollowedId.eq(user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.follower_id).collect())
}

/// Ids of users `user_id` follows, oldest edge first.
pub async fn following_ids<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Vec<String>, errors::ModelError> {
    let rows = Entity::find()
        .filter(Column::FollowerId.eq(user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.followed_id).collect())
}

pub async fn count_followers<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<u64, errors::ModelError> {
    Ok(Entity::find().filter(Column::FollowedId.eq(user_id)).count(db).await?)
}

pub async fn count_following<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<u64, errors::ModelError> {
    Ok(Entity::find().filter(Column::FollowerId.eq(user_id)).count(db).await?)
}
