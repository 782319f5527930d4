//! Service layer: domain types, repository traits and their JSON-file and
//! Postgres implementations, and the auth/user/story/catalog services the
//! HTTP server calls into.
//! - Separates business logic from data access.
//! - Reuses the entity definitions in the `models` crate for Postgres.

pub mod errors;
pub mod auth;
pub mod users;
pub mod stories;
pub mod catalog;
pub mod uploads;
pub mod pagination;
pub mod storage;
pub mod file;
pub mod db;
pub mod backend;
pub mod import;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use backend::Stores;
pub use errors::ServiceError;
