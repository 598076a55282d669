use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feed::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Feed::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Feed::FeedUrl).string().unique_key().not_null())
                    .col(ColumnDef::new(Feed::Name).string().not_null())
                    .col(ColumnDef::new(Feed::Webpage).string())
                    .col(ColumnDef::new(Feed::Description).string().not_null().default(""))
                    .col(ColumnDef::new(Feed::Etag).string())
                    .col(ColumnDef::new(Feed::LastUpdated).timestamp())
                    .col(ColumnDef::new(Feed::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Feed::AutoApprove).boolean().not_null().default(false))
                    .col(ColumnDef::new(Feed::AutoUpdate).boolean().not_null().default(true))
                    .col(ColumnDef::new(Feed::AutoAuthors).json())
                    .col(ColumnDef::new(Feed::AutoCategories).json())
                    .col(
                        ColumnDef::new(Feed::WhenSubmitted)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavedSearch::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavedSearch::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SavedSearch::QueryString)
                            .string()
                            .unique_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavedSearch::AutoApprove)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SavedSearch::AutoUpdate)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SavedSearch::AutoAuthors).json())
                    .col(ColumnDef::new(SavedSearch::AutoCategories).json())
                    .col(
                        ColumnDef::new(SavedSearch::WhenCreated)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SourceImport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SourceImport::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SourceImport::FeedId).unsigned())
                    .col(ColumnDef::new(SourceImport::SearchId).unsigned())
                    .col(
                        ColumnDef::new(SourceImport::AutoApprove)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SourceImport::StartedAt)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SourceImport::LastActivity)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(ColumnDef::new(SourceImport::TotalVideos).integer())
                    .col(
                        ColumnDef::new(SourceImport::VideosImported)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SourceImport::VideosSkipped)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SourceImport::VideosErrored)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SourceImport::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(SourceImport::ErrorMessage).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Video::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Video::FeedId).unsigned())
                    .col(ColumnDef::new(Video::SearchId).unsigned())
                    .col(ColumnDef::new(Video::ImportId).unsigned())
                    .col(ColumnDef::new(Video::Guid).string())
                    .col(ColumnDef::new(Video::Name).string().not_null())
                    .col(ColumnDef::new(Video::Description).string().not_null().default(""))
                    .col(ColumnDef::new(Video::WebsiteUrl).string())
                    .col(ColumnDef::new(Video::FileUrl).string())
                    .col(ColumnDef::new(Video::FileUrlLength).big_integer())
                    .col(ColumnDef::new(Video::FileUrlMimetype).string())
                    .col(ColumnDef::new(Video::ThumbnailUrl).string())
                    .col(ColumnDef::new(Video::ThumbnailPath).string())
                    .col(ColumnDef::new(Video::Tags).json())
                    .col(ColumnDef::new(Video::Authors).json())
                    .col(ColumnDef::new(Video::Categories).json())
                    .col(ColumnDef::new(Video::Status).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Video::WhenSubmitted)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(ColumnDef::new(Video::WhenApproved).timestamp())
                    .col(ColumnDef::new(Video::WhenPublished).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Video::Table)
                    .name("idx_video_feed_id_guid")
                    .col(Video::FeedId)
                    .col(Video::Guid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Video::Table)
                    .name("idx_video_website_url")
                    .col(Video::WebsiteUrl)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Video::Table)
                    .name("idx_video_import_id")
                    .col(Video::ImportId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SourceImport::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavedSearch::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Feed::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Feed {
    Table,
    Id,
    FeedUrl,
    Name,
    Webpage,
    Description,
    Etag,
    LastUpdated,
    Status,
    AutoApprove,
    AutoUpdate,
    AutoAuthors,
    AutoCategories,
    WhenSubmitted,
}

#[derive(DeriveIden)]
enum SavedSearch {
    Table,
    Id,
    QueryString,
    AutoApprove,
    AutoUpdate,
    AutoAuthors,
    AutoCategories,
    WhenCreated,
}

#[derive(DeriveIden)]
enum SourceImport {
    Table,
    Id,
    FeedId,
    SearchId,
    AutoApprove,
    StartedAt,
    LastActivity,
    TotalVideos,
    VideosImported,
    VideosSkipped,
    VideosErrored,
    Status,
    ErrorMessage,
}

#[derive(DeriveIden)]
enum Video {
    Table,
    Id,
    FeedId,
    SearchId,
    ImportId,
    Guid,
    Name,
    Description,
    WebsiteUrl,
    FileUrl,
    FileUrlLength,
    FileUrlMimetype,
    ThumbnailUrl,
    ThumbnailPath,
    Tags,
    Authors,
    Categories,
    Status,
    WhenSubmitted,
    WhenApproved,
    WhenPublished,
}
