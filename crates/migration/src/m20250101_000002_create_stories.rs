//! Create `stories` table.
//!
//! `author_id` is nullable: stories imported from the JSON archive only carry an author name.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stories::Table)
                    .if_not_exists()
                    .col(string_len(Stories::Id, 64).primary_key())
                    .col(ColumnDef::new(Stories::AuthorId).string_len(64).null())
                    .col(string_len(Stories::Author, 128).not_null())
                    .col(string_len(Stories::AuthorInitials, 16).not_null().default(""))
                    .col(text(Stories::Title).not_null().default(""))
                    .col(text(Stories::Excerpt).not_null().default(""))
                    .col(text(Stories::Content).not_null().default(""))
                    .col(ColumnDef::new(Stories::Category).string_len(32).null())
                    .col(ColumnDef::new(Stories::Circle).string_len(64).null())
                    .col(json_binary(Stories::Images).not_null())
                    .col(ColumnDef::new(Stories::Location).json_binary().null())
                    .col(ColumnDef::new(Stories::AudioUrl).text().null())
                    .col(ColumnDef::new(Stories::VideoUrl).text().null())
                    .col(ColumnDef::new(Stories::Language).string_len(16).null())
                    .col(ColumnDef::new(Stories::ProfileImage).text().null())
                    .col(ColumnDef::new(Stories::Context).text().null())
                    .col(boolean(Stories::IsAnonymous).not_null().default(false))
                    .col(boolean(Stories::HasAudio).not_null().default(false))
                    .col(boolean(Stories::HasVideo).not_null().default(false))
                    .col(string_len(Stories::Status, 16).not_null().default("approved"))
                    .col(integer(Stories::Likes).not_null().default(0))
                    .col(integer(Stories::Comments).not_null().default(0))
                    .col(integer(Stories::FeltThisCount).not_null().default(0))
                    .col(timestamp_with_time_zone(Stories::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stories_author")
                            .from(Stories::Table, Stories::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Stories::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Stories {
    Table,
    Id,
    AuthorId,
    Author,
    AuthorInitials,
    Title,
    Excerpt,
    Content,
    Category,
    Circle,
    Images,
    Location,
    AudioUrl,
    VideoUrl,
    Language,
    ProfileImage,
    Context,
    IsAnonymous,
    HasAudio,
    HasVideo,
    Status,
    Likes,
    Comments,
    FeltThisCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users { Table, Id }
