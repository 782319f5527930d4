use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Stories: public listing filters by status and sorts by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_stories_status_created")
                    .table(Stories::Table)
                    .col(Stories::Status)
                    .col(Stories::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stories_author")
                    .table(Stories::Table)
                    .col(Stories::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Follows: one edge per pair
        manager
            .create_index(
                Index::create()
                    .name("uniq_follows_pair")
                    .table(Follows::Table)
                    .col(Follows::FollowerId)
                    .col(Follows::FollowedId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_follows_followed")
                    .table(Follows::Table)
                    .col(Follows::FollowedId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_story")
                    .table(Comments::Table)
                    .col(Comments::StoryId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Reactions: one row per (story, user, kind)
        manager
            .create_index(
                Index::create()
                    .name("uniq_story_reactions")
                    .table(StoryReactions::Table)
                    .col(StoryReactions::StoryId)
                    .col(StoryReactions::UserId)
                    .col(StoryReactions::Kind)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_stories_status_created").table(Stories::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stories_author").table(Stories::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_follows_pair").table(Follows::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_follows_followed").table(Follows::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comments_story").table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_story_reactions").table(StoryReactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Stories { Table, Status, CreatedAt, AuthorId }

#[derive(DeriveIden)]
enum Follows { Table, FollowerId, FollowedId }

#[derive(DeriveIden)]
enum Comments { Table, StoryId, CreatedAt }

#[derive(DeriveIden)]
enum StoryReactions { Table, StoryId, UserId, Kind }
