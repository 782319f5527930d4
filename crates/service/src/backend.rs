//! Store wiring for the two persistence backends.

use std::{path::Path, sync::Arc};

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::db::{DbStoryStore, DbUserStore};
use crate::errors::ServiceError;
use crate::file::{FileStoryStore, FileUserStore};
use crate::stories::StoryStore;
use crate::users::UserStore;

/// The repositories every service is built from.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub stories: Arc<dyn StoryStore>,
}

impl Stores {
    /// JSON files under `data_dir`, created empty when missing.
    pub async fn file(data_dir: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let dir = data_dir.as_ref();
        let users = FileUserStore::open(dir).await?;
        let stories = FileStoryStore::open(dir).await?;
        info!(data_dir = %dir.display(), "file stores ready");
        Ok(Self { users, stories })
    }

    /// Postgres tables; the schema must already be migrated.
    pub fn postgres(db: DatabaseConnection) -> Self {
        Self { users: DbUserStore::new(db.clone()), stories: DbStoryStore::new(db) }
    }
}
