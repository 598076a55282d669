//! Feed source configuration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::custom_type::StringVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Display, EnumString, Serialize, Deserialize)]
#[derive(sea_orm::DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum FeedStatus {
    #[sea_orm(num_value = 0)]
    Unapproved = 0,
    #[sea_orm(num_value = 1)]
    Active = 1,
    #[sea_orm(num_value = 2)]
    Rejected = 2,
}

impl Default for FeedStatus {
    fn default() -> Self {
        FeedStatus::Unapproved
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feed")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub feed_url: String,
    pub name: String,
    pub webpage: Option<String>,
    pub description: String,
    /// Last `ETag` returned by the feed server, sent back as `If-None-Match`
    /// so unchanged feeds can be skipped without a full parse.
    pub etag: Option<String>,
    pub last_updated: Option<DateTime>,
    pub status: FeedStatus,
    pub auto_approve: bool,
    pub auto_update: bool,
    pub auto_authors: Option<StringVec>,
    pub auto_categories: Option<StringVec>,
    pub when_submitted: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::video::Entity")]
    Video,
    #[sea_orm(has_many = "super::source_import::Entity")]
    SourceImport,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl Related<super::source_import::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceImport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
