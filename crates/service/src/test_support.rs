#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

use crate::auth::Claims;
use crate::backend::Stores;
use crate::errors::ServiceError;
use crate::users::{Role, UserRecord, UserStore};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_db_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig::from_env();
    cfg.min_connections = 1;
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.connect_timeout_secs = 5;
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// A migrated database connection, or `None` when `SKIP_DB_TESTS` is set or
/// nothing is listening.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_db_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {}", e);
                return false;
            }
            true
        })
        .await;
    if !migrated {
        return Ok(None);
    }
    // fresh connection for the current test's runtime
    Ok(Some(connect_with_config(&test_db_config()).await?))
}

/// File-backed stores in a fresh temporary directory.
pub async fn file_stores() -> Result<Stores, ServiceError> {
    Stores::file(std::env::temp_dir().join(format!("echoes_test_{}", uuid::Uuid::new_v4()))).await
}

pub async fn seed_user(users: &dyn UserStore, name: &str) -> Result<UserRecord, ServiceError> {
    let email = format!("{}-{}@example.com", name.to_lowercase().replace(' ', "."), uuid::Uuid::new_v4().simple());
    users.create(UserRecord::new(name, email, "$argon2id$test".into())).await
}

pub async fn make_admin(stores: &Stores, id: &str) -> Result<(), ServiceError> {
    let mut user = stores.users.get(id).await?.ok_or_else(|| ServiceError::not_found("User"))?;
    user.role = Role::Admin;
    stores.users.upsert(user).await
}

pub fn claims_for(user: &UserRecord) -> Claims {
    Claims { id: user.id.clone(), email: user.email.clone(), name: user.name.clone(), iat: 0, exp: usize::MAX }
}
