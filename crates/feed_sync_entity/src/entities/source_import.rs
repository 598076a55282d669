//! Append-only audit log, one row per ingestion run against a source.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display, EnumString, Serialize, Deserialize)]
#[derive(sea_orm::DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum ImportStatus {
    #[sea_orm(num_value = 0)]
    Started = 0,
    #[sea_orm(num_value = 1)]
    Complete = 1,
    #[sea_orm(num_value = 2)]
    Failed = 2,
}

impl Default for ImportStatus {
    fn default() -> Self {
        ImportStatus::Started
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "source_import")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Exactly one of `feed_id` / `search_id` is set.
    pub feed_id: Option<i32>,
    pub search_id: Option<i32>,
    /// Snapshot of the source's auto_approve flag when the run started, so a
    /// flag flip mid-run doesn't change how this run's videos are approved.
    pub auto_approve: bool,
    pub started_at: DateTime,
    pub last_activity: DateTime,
    pub total_videos: Option<i32>,
    pub videos_imported: i32,
    pub videos_skipped: i32,
    pub videos_errored: i32,
    pub status: ImportStatus,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::feed::Entity",
        from = "Column::FeedId",
        to = "super::feed::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Feed,
    #[sea_orm(
        belongs_to = "super::saved_search::Entity",
        from = "Column::SearchId",
        to = "super::saved_search::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SavedSearch,
    #[sea_orm(has_many = "super::video::Entity")]
    Video,
}

impl Related<super::feed::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feed.def()
    }
}

impl Related<super::saved_search::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedSearch.def()
    }
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
