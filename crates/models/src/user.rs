use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub avatar: String,
    pub location: String,
    pub website: String,
    pub role: String,
    pub joined_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Story,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Story => Entity::has_many(crate::story::Entity).into() }
    }
}

impl Related<crate::story::Entity> for Entity {
    fn to() -> RelationDef { Relation::Story.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn set_password(db: &DatabaseConnection, id: &str, password_hash: String) -> Result<Model, errors::ModelError> {
    if password_hash.trim().is_empty() {
        return Err(errors::ModelError::Validation("password hash required".into()));
    }
    let mut found: ActiveModel = Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::Validation("user not found".into()))?
        .into();
    found.password_hash = Set(password_hash);
    Ok(found.update(db).await?)
}
