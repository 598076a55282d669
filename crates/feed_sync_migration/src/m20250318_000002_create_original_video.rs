use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OriginalVideo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OriginalVideo::Id)
                            .unsigned()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OriginalVideo::VideoId)
                            .unsigned()
                            .unique_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OriginalVideo::Name).string().not_null())
                    .col(
                        ColumnDef::new(OriginalVideo::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(OriginalVideo::Tags).json())
                    .col(ColumnDef::new(OriginalVideo::ThumbnailUrl).string())
                    .col(ColumnDef::new(OriginalVideo::RemoteThumbnailHash).string())
                    .col(
                        ColumnDef::new(OriginalVideo::RemoteVideoWasDeleted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OriginalVideo::LastChecked)
                            .timestamp()
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OriginalVideo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OriginalVideo {
    Table,
    Id,
    VideoId,
    Name,
    Description,
    Tags,
    ThumbnailUrl,
    RemoteThumbnailHash,
    RemoteVideoWasDeleted,
    LastChecked,
}
