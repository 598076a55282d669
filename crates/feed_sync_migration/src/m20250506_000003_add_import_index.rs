use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Video::Table)
                    .add_column(ColumnDef::new(Video::ImportIndex).integer())
                    .to_owned(),
            )
            .await?;

        // Listing pages sort by (import run, position in feed).
        manager
            .create_index(
                Index::create()
                    .table(Video::Table)
                    .name("idx_video_import_id_import_index")
                    .col(Video::ImportId)
                    .col(Video::ImportIndex)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .table(Video::Table)
                    .name("idx_video_import_id_import_index")
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Video::Table)
                    .drop_column(Video::ImportIndex)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Video {
    Table,
    ImportId,
    ImportIndex,
}
