//! Postgres backend over the SeaORM entities in `models`.

pub mod story_store;
pub mod user_store;

pub use story_store::DbStoryStore;
pub use user_store::DbUserStore;
