//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_stories;
mod m20250101_000003_create_follows;
mod m20250101_000004_create_comments;
mod m20250101_000005_create_story_reactions;
mod m20250101_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_stories::Migration),
            Box::new(m20250101_000003_create_follows::Migration),
            Box::new(m20250101_000004_create_comments::Migration),
            Box::new(m20250101_000005_create_story_reactions::Migration),
            // Indexes should always be applied last
            Box::new(m20250101_000010_add_indexes::Migration),
        ]
    }
}
