//! SeaORM entities backing the Postgres store.

pub mod errors;
pub mod db;
pub mod user;
pub mod story;
pub mod follow;
pub mod comment;
pub mod story_reaction;
