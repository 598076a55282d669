use feed_sync_entity::*;
use sea_orm::ActiveValue::Set;
use sea_orm::Unchanged;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::SimpleExpr;

use crate::adapter::{FetchedRecords, VideoSource, _ActiveModel};
use crate::error::ScrapeError;
use crate::scraper::ScrapeClient;
use crate::scraper::feed::{FetchedFeed, fetch_feed};

impl VideoSource for feed::Model {
    fn display_name(&self) -> String {
        format!("feed {} - {}", self.id, self.name)
    }

    fn filter_expr(&self) -> SimpleExpr {
        video::Column::FeedId.eq(self.id)
    }

    fn set_relation_id(&self, video_model: &mut video::ActiveModel) {
        video_model.feed_id = Set(Some(self.id));
    }

    fn set_import_relation_id(&self, import_model: &mut source_import::ActiveModel) {
        import_model.feed_id = Set(Some(self.id));
    }

    fn auto_approve(&self) -> bool {
        self.auto_approve
    }

    fn auto_authors(&self) -> Option<&StringVec> {
        self.auto_authors.as_ref()
    }

    fn auto_categories(&self) -> Option<&StringVec> {
        self.auto_categories.as_ref()
    }

    fn after_update(&self, etag: Option<String>, now: DateTime) -> _ActiveModel {
        _ActiveModel::Feed(feed::ActiveModel {
            id: Unchanged(self.id),
            etag: Set(etag),
            last_updated: Set(Some(now)),
            status: Set(feed::FeedStatus::Active),
            ..Default::default()
        })
    }

    fn log_refresh_start(&self) {
        info!("polling feed {} - {}...", self.id, self.name);
    }

    fn log_refresh_end(&self, imported: i32, skipped: i32, errored: i32) {
        info!(
            "feed {} - {} done, {} imported, {} skipped, {} errored",
            self.id, self.name, imported, skipped, errored
        );
    }
}

pub(super) async fn fetch(feed: &feed::Model, client: &ScrapeClient) -> Result<FetchedRecords, ScrapeError> {
    match fetch_feed(client, &feed.feed_url, feed.etag.as_deref()).await? {
        FetchedFeed::NotModified => Ok(FetchedRecords::NotModified),
        FetchedFeed::Fetched(remote) => Ok(FetchedRecords::Records {
            entries: remote.entries,
            etag: remote.etag,
        }),
    }
}
