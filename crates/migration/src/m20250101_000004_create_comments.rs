//! Create `comments` table, removed together with its story.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(string_len(Comments::Id, 64).primary_key())
                    .col(string_len(Comments::StoryId, 64).not_null())
                    .col(string_len(Comments::AuthorId, 64).not_null())
                    .col(string_len(Comments::Author, 128).not_null())
                    .col(text(Comments::Text).not_null())
                    .col(timestamp_with_time_zone(Comments::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_story")
                            .from(Comments::Table, Comments::StoryId)
                            .to(Stories::Table, Stories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Comments { Table, Id, StoryId, AuthorId, Author, Text, CreatedAt }

#[derive(DeriveIden)]
enum Stories { Table, Id }
