//! Create `users` table.
//!
//! Profile fields default to empty strings so legacy JSON rows import as-is.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(string_len(Users::Id, 64).primary_key())
                    .col(string_len(Users::Name, 128).not_null())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(string_len(Users::PasswordHash, 255).not_null())
                    .col(text(Users::Bio).not_null().default(""))
                    .col(text(Users::Avatar).not_null().default(""))
                    .col(string_len(Users::Location, 255).not_null().default(""))
                    .col(string_len(Users::Website, 512).not_null().default(""))
                    .col(string_len(Users::Role, 16).not_null().default("user"))
                    .col(timestamp_with_time_zone(Users::JoinedDate).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, Name, Email, PasswordHash, Bio, Avatar, Location, Website, Role, JoinedDate }
