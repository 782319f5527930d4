use std::{path::PathBuf, sync::Arc};

use configs::AppConfig;
use service::{
    auth::{AuthService, TokenKeys},
    catalog::CatalogService,
    stories::{StoryPolicy, StoryService},
    uploads::AvatarStorage,
    users::UserService,
    Stores,
};

/// Paths the router serves files from.
#[derive(Clone, Debug)]
pub struct ServerPaths {
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

/// Request body caps in bytes.
#[derive(Clone, Copy, Debug)]
pub struct BodyLimits {
    pub story_json: usize,
}

/// Shared handler state; every field is cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub stories: Arc<StoryService>,
    pub catalog: Arc<CatalogService>,
    pub uploads: Arc<AvatarStorage>,
    pub paths: ServerPaths,
    pub limits: BodyLimits,
}

impl ServerState {
    pub fn new(stores: Stores, cfg: &AppConfig) -> Self {
        let keys = TokenKeys::new(&cfg.auth.jwt_secret, cfg.auth.token_ttl_hours);
        let policy = StoryPolicy { require_moderation: cfg.stories.require_moderation };
        Self {
            auth: Arc::new(AuthService::new(stores.users.clone(), keys)),
            users: Arc::new(UserService::new(stores.users.clone(), stores.stories.clone())),
            stories: Arc::new(StoryService::new(stores.stories.clone(), stores.users.clone(), policy)),
            catalog: Arc::new(CatalogService::new(stores.stories.clone())),
            uploads: Arc::new(AvatarStorage::new(&cfg.storage.upload_dir)),
            paths: ServerPaths {
                upload_dir: PathBuf::from(&cfg.storage.upload_dir),
                static_dir: PathBuf::from(&cfg.storage.static_dir),
            },
            limits: BodyLimits { story_json: cfg.server.json_body_limit },
        }
    }
}
