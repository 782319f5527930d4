//! Create `story_reactions` table (`like`, `felt_this`, `bookmark` per user and story).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StoryReactions::Table)
                    .if_not_exists()
                    .col(uuid(StoryReactions::Id).primary_key())
                    .col(string_len(StoryReactions::StoryId, 64).not_null())
                    .col(string_len(StoryReactions::UserId, 64).not_null())
                    .col(string_len(StoryReactions::Kind, 16).not_null())
                    .col(timestamp_with_time_zone(StoryReactions::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_reactions_story")
                            .from(StoryReactions::Table, StoryReactions::StoryId)
                            .to(Stories::Table, Stories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_story_reactions_user")
                            .from(StoryReactions::Table, StoryReactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StoryReactions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StoryReactions { Table, Id, StoryId, UserId, Kind, CreatedAt }

#[derive(DeriveIden)]
enum Stories { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
