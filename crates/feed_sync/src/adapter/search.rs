use feed_sync_entity::*;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::SimpleExpr;

use crate::adapter::{FetchedRecords, VideoSource, _ActiveModel};
use crate::error::ScrapeError;
use crate::scraper::ScrapeClient;
use crate::scraper::search::fetch_search;

impl VideoSource for saved_search::Model {
    fn display_name(&self) -> String {
        format!("search {} - \"{}\"", self.id, self.query_string)
    }

    fn filter_expr(&self) -> SimpleExpr {
        video::Column::SearchId.eq(self.id)
    }

    fn set_relation_id(&self, video_model: &mut video::ActiveModel) {
        video_model.search_id = Set(Some(self.id));
    }

    fn set_import_relation_id(&self, import_model: &mut source_import::ActiveModel) {
        import_model.search_id = Set(Some(self.id));
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

    // searches carry no etag and no last-updated bookkeeping
    fn after_update(&self, _etag: Option<String>, _now: DateTime) -> _ActiveModel {
        _ActiveModel::None
    }

    fn log_refresh_start(&self) {
        info!("polling search {} - \"{}\"...", self.id, self.query_string);
    }

    fn log_refresh_end(&self, imported: i32, skipped: i32, errored: i32) {
        info!(
            "search {} - \"{}\" done, {} imported, {} skipped, {} errored",
            self.id, self.query_string, imported, skipped, errored
        );
    }
}

pub(super) async fn fetch(search: &saved_search::Model, client: &ScrapeClient) -> Result<FetchedRecords, ScrapeError> {
    let entries = fetch_search(client, &search.query_string).await?;
    Ok(FetchedRecords::Records { entries, etag: None })
}
