use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(feed_sync_migration::Migrator).await;
}
