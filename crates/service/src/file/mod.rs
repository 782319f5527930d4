//! JSON file backend: `users.json`, `stories.json`, `comments.json` and
//! `reactions.json` under one data directory.

pub mod story_store;
pub mod user_store;

pub use story_store::FileStoryStore;
pub use user_store::FileUserStore;
