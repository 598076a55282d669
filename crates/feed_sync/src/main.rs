#[macro_use]
extern crate tracing;

mod adapter;
mod config;
mod database;
mod downloader;
mod error;
mod notifier;
mod original;
mod scraper;
mod utils;
mod workflow;

use std::time::Duration;

use once_cell::sync::Lazy;
use sea_orm::DatabaseConnection;
use tokio::time;

use crate::config::{ARGS, CONFIG};
use crate::database::{database_connection, migrate_database};
use crate::scraper::ScrapeClient;
use crate::utils::init_logger;
use crate::utils::model::get_enabled_sources;
use crate::workflow::{process_sources, refresh_originals};

#[tokio::main]
async fn main() {
    Lazy::force(&ARGS);
    init_logger(&ARGS.log_level);
    Lazy::force(&CONFIG);
    migrate_database().await.unwrap();
    let connection = database_connection().await.unwrap();
    let client = ScrapeClient::new();
    tokio::select! {
        _ = utils::signal::terminate() => {
            info!("received shutdown signal, exiting");
        }
        _ = poll_loop(&client, &connection) => {}
    }
}

async fn poll_loop(client: &ScrapeClient, connection: &DatabaseConnection) {
    loop {
        let sources = match get_enabled_sources(connection).await {
            Ok(sources) => sources,
            Err(e) => {
                error!("loading enabled sources failed: {e:#}, waiting for the next pass");
                time::sleep(Duration::from_secs(CONFIG.interval)).await;
                continue;
            }
        };
        if sources.is_empty() {
            warn!("no sources are enabled, nothing to poll");
        }
        process_sources(&sources, client, connection).await;
        info!("all sources processed");
        if let Err(e) = refresh_originals(client, connection).await {
            error!("reconciling videos against their hosts failed: {e:#}");
        }
        if ARGS.once {
            info!("single pass done, exiting");
            break;
        }
        info!("waiting {} seconds before the next pass", CONFIG.interval);
        time::sleep(Duration::from_secs(CONFIG.interval)).await;
    }
}
