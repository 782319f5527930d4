use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use models::{follow, user};
use sea_orm::{
    sea_query::{Expr, Func, OnConflict},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, SqlErr, TransactionTrait,
};

use crate::errors::ServiceError;
use crate::users::{FollowCounts, ProfileUpdate, Role, UserRecord, UserStore};

/// Users in the `users` table; follow edges in `follows`.
pub struct DbUserStore {
    db: DatabaseConnection,
}

impl DbUserStore {
    pub fn new(db: DatabaseConnection) -> Arc<Self> { Arc::new(Self { db }) }

    async fn with_edges(&self, m: user::Model) -> Result<UserRecord, ServiceError> {
        let followers = follow::follower_ids(&self.db, &m.id).await?;
        let following = follow::following_ids(&self.db, &m.id).await?;
        Ok(UserRecord {
            id: m.id,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            bio: m.bio,
            avatar: m.avatar,
            location: m.location,
            website: m.website,
            joined_date: m.joined_date.with_timezone(&Utc),
            role: Role::parse(&m.role),
            followers,
            following,
        })
    }

    async fn require(&self, id: &str) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    async fn counts(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError> {
        Ok(FollowCounts {
            followers_count: follow::count_followers(&self.db, followed_id).await? as usize,
            following_count: follow::count_following(&self.db, follower_id).await? as usize,
        })
    }
}

fn active(u: &UserRecord) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id.clone()),
        name: Set(u.name.clone()),
        email: Set(u.email.clone()),
        password_hash: Set(u.password_hash.clone()),
        bio: Set(u.bio.clone()),
        avatar: Set(u.avatar.clone()),
        location: Set(u.location.clone()),
        website: Set(u.website.clone()),
        role: Set(u.role.as_str().to_string()),
        joined_date: Set(u.joined_date.into()),
    }
}

/// `%needle%` for LIKE with the wildcard characters escaped.
fn like_pattern(query: &str) -> String {
    let escaped = query.to_lowercase().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserStore for DbUserStore {
    async fn get(&self, id: &str) -> Result<Option<UserRecord>, ServiceError> {
        match user::Entity::find_by_id(id.to_string()).one(&self.db).await? {
            Some(m) => Ok(Some(self.with_edges(m).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, ServiceError> {
        match user::find_by_email(&self.db, email).await? {
            Some(m) => Ok(Some(self.with_edges(m).await?)),
            None => Ok(None),
        }
    }

    async fn get_many(&self, ids: &[String]) -> Result<Vec<UserRecord>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = user::Entity::find().filter(user::Column::Id.is_in(ids.to_vec())).all(&self.db).await?;
        let mut out = Vec::with_capacity(rows.len());
        for id in ids {
            if let Some(m) = rows.iter().find(|m| &m.id == id) {
                out.push(self.with_edges(m.clone()).await?);
            }
        }
        Ok(out)
    }

    async fn create(&self, u: UserRecord) -> Result<UserRecord, ServiceError> {
        if user::find_by_email(&self.db, &u.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".into()));
        }
        match active(&u).insert(&self.db).await {
            Ok(m) => self.with_edges(m).await,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ServiceError::Conflict("Email already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, u: UserRecord) -> Result<(), ServiceError> {
        user::Entity::insert(active(&u))
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([
                        user::Column::Name,
                        user::Column::Email,
                        user::Column::PasswordHash,
                        user::Column::Bio,
                        user::Column::Avatar,
                        user::Column::Location,
                        user::Column::Website,
                        user::Column::Role,
                        user::Column::JoinedDate,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<UserRecord, ServiceError> {
        let mut am: user::ActiveModel = self.require(id).await?.into();
        if let Some(bio) = update.bio { am.bio = Set(bio); }
        if let Some(avatar) = update.avatar { am.avatar = Set(avatar); }
        if let Some(location) = update.location { am.location = Set(location); }
        if let Some(website) = update.website { am.website = Set(website); }
        let m = am.update(&self.db).await?;
        self.with_edges(m).await
    }

    async fn set_password(&self, id: &str, password_hash: String) -> Result<(), ServiceError> {
        self.require(id).await?;
        user::set_password(&self.db, id, password_hash).await?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<UserRecord>, ServiceError> {
        let pattern = like_pattern(query);
        let rows = user::Entity::find()
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Name))).like(pattern.as_str()))
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(pattern.as_str())),
            )
            .order_by_asc(user::Column::JoinedDate)
            .limit(limit as u64)
            .all(&self.db)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for m in rows {
            out.push(self.with_edges(m).await?);
        }
        Ok(out)
    }

    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError> {
        self.require(follower_id).await?;
        self.require(followed_id).await?;
        let txn = self.db.begin().await?;
        if !follow::exists(&txn, follower_id, followed_id).await? {
            follow::create(&txn, follower_id, followed_id).await?;
        }
        txn.commit().await?;
        self.counts(follower_id, followed_id).await
    }

    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> Result<FollowCounts, ServiceError> {
        self.require(follower_id).await?;
        self.require(followed_id).await?;
        follow::delete_pair(&self.db, follower_id, followed_id).await?;
        self.counts(follower_id, followed_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Ma%ria_"), "%ma\\%ria\\_%");
    }

    #[tokio::test]
    async fn create_search_and_follow() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let store = DbUserStore::new(db.clone());
        let tag = uuid::Uuid::new_v4().simple().to_string();
        let a = store.create(UserRecord::new(format!("Ana {tag}"), format!("ana-{tag}@example.com"), "h".into())).await?;
        let b = store.create(UserRecord::new(format!("Ben {tag}"), format!("ben-{tag}@example.com"), "h".into())).await?;
        let dup = store.create(UserRecord::new("Dup", a.email.clone(), "h".into())).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        assert_eq!(store.search(&tag.to_uppercase(), 20).await?.len(), 2);

        let counts = store.add_follow(&a.id, &b.id).await?;
        assert_eq!(counts, FollowCounts { followers_count: 1, following_count: 1 });
        assert_eq!(store.get(&b.id).await?.map(|u| u.followers), Some(vec![a.id.clone()]));
        let counts = store.remove_follow(&a.id, &b.id).await?;
        assert_eq!(counts, FollowCounts { followers_count: 0, following_count: 0 });

        user::Entity::delete_by_id(a.id).exec(&db).await?;
        user::Entity::delete_by_id(b.id).exec(&db).await?;
        Ok(())
    }
}
