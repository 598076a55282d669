//! Imported video rows, one per deduplicated feed/search entry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::custom_type::StringVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display, EnumString, Serialize, Deserialize)]
#[derive(sea_orm::DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum VideoStatus {
    /// Created by a running import, not yet handed to the approval pass.
    #[sea_orm(num_value = 0)]
    Pending = 0,
    /// Waiting in the moderation queue.
    #[sea_orm(num_value = 1)]
    Unapproved = 1,
    /// Publicly visible.
    #[sea_orm(num_value = 2)]
    Active = 2,
    /// Rejected by a moderator; only an explicit admin action brings it back.
    #[sea_orm(num_value = 3)]
    Rejected = 3,
}

impl Default for VideoStatus {
    fn default() -> Self {
        VideoStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub feed_id: Option<i32>,
    pub search_id: Option<i32>,
    /// Import run that created this row, kept so a failed run can be rolled
    /// back wholesale.
    pub import_id: Option<i32>,
    /// Position within the originating import run, preserving feed order.
    pub import_index: Option<i32>,
    pub guid: Option<String>,
    pub name: String,
    pub description: String,
    pub website_url: Option<String>,
    pub file_url: Option<String>,
    pub file_url_length: Option<i64>,
    pub file_url_mimetype: Option<String>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_path: Option<String>,
    pub tags: Option<StringVec>,
    pub authors: Option<StringVec>,
    pub categories: Option<StringVec>,
    pub status: VideoStatus,
    pub when_submitted: DateTime,
    pub when_approved: Option<DateTime>,
    pub when_published: Option<DateTime>,
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
    #[sea_orm(
        belongs_to = "super::source_import::Entity",
        from = "Column::ImportId",
        to = "super::source_import::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SourceImport,
    #[sea_orm(has_one = "super::original_video::Entity")]
    OriginalVideo,
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

impl Related<super::source_import::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceImport.def()
    }
}

impl Related<super::original_video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OriginalVideo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
