use anyhow::Result;
use feed_sync_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::CONFIG_DIR;

fn database_url() -> String {
    format!("sqlite://{}?mode=rwc", CONFIG_DIR.join("data.sqlite").to_string_lossy())
}

pub async fn database_connection() -> Result<DatabaseConnection> {
    let mut option = ConnectOptions::new(database_url());
    option
        .max_connections(100)
        .min_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(90));
    Ok(Database::connect(option).await?)
}

pub async fn migrate_database() -> Result<()> {
    // migrations run on a plain single connection; a pooled connection can
    // apply them out of order
    let connection = Database::connect(database_url()).await?;
    Ok(Migrator::up(&connection, None).await?)
}
