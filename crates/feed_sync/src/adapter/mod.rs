mod feed;
mod search;

use anyhow::Result;
use enum_dispatch::enum_dispatch;
use feed_sync_entity::StringVec;
use feed_sync_entity::feed::Model as Feed;
use feed_sync_entity::saved_search::Model as SavedSearch;
use sea_orm::DatabaseConnection;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::SimpleExpr;

use crate::error::ScrapeError;
use crate::scraper::{ScrapeClient, VideoRecord};

#[enum_dispatch]
pub enum VideoSourceEnum {
    Feed,
    SavedSearch,
}

#[enum_dispatch(VideoSourceEnum)]
pub trait VideoSource {
    /// Human-readable name used in log lines and notifications.
    fn display_name(&self) -> String;

    /// Filter restricting video queries to this source, which also scopes
    /// guid deduplication to it.
    fn filter_expr(&self) -> SimpleExpr;

    /// Point a new video row at this source.
    fn set_relation_id(&self, video_model: &mut feed_sync_entity::video::ActiveModel);

    /// Point a new import row at this source.
    fn set_import_relation_id(&self, import_model: &mut feed_sync_entity::source_import::ActiveModel);

    fn auto_approve(&self) -> bool;

    fn auto_authors(&self) -> Option<&StringVec>;

    fn auto_categories(&self) -> Option<&StringVec>;

    /// State to persist after a successful run. Different sources return
    /// different ActiveModel types; for object safety that has to go through
    /// a hand-written enum rather than `impl Trait`.
    fn after_update(&self, etag: Option<String>, now: DateTime) -> _ActiveModel;

    fn log_refresh_start(&self);

    fn log_refresh_end(&self, imported: i32, skipped: i32, errored: i32);
}

/// What a polling fetch produced for one source.
pub enum FetchedRecords {
    /// The remote side says nothing changed since the recorded etag.
    NotModified,
    Records {
        entries: Vec<VideoRecord>,
        etag: Option<String>,
    },
}

/// Fetching is async and therefore lives outside the enum_dispatch trait.
pub async fn fetch_records(source: &VideoSourceEnum, client: &ScrapeClient) -> Result<FetchedRecords, ScrapeError> {
    match source {
        VideoSourceEnum::Feed(feed) => feed::fetch(feed, client).await,
        VideoSourceEnum::SavedSearch(search) => search::fetch(search, client).await,
    }
}

pub enum _ActiveModel {
    Feed(feed_sync_entity::feed::ActiveModel),
    None,
}

impl _ActiveModel {
    pub async fn save(self, connection: &DatabaseConnection) -> Result<()> {
        match self {
            _ActiveModel::Feed(model) => {
                model.save(connection).await?;
            }
            _ActiveModel::None => {}
        }
        Ok(())
    }
}
