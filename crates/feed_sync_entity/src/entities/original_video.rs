//! Snapshot of a video's externally-sourced metadata, refreshed on every
//! drift poll and used purely for diffing against the remote copy.

use sea_orm::entity::prelude::*;

use crate::custom_type::StringVec;

/// Remote deletion is confirmed over two consecutive polls before anyone is
/// notified, which absorbs transient scraper failures.
pub const REMOTE_ALIVE: i32 = 0;
pub const REMOTE_DELETED_SUSPECTED: i32 = 1;
pub const REMOTE_DELETED_NOTIFIED: i32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "original_video")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub video_id: i32,
    pub name: String,
    pub description: String,
    pub tags: Option<StringVec>,
    pub thumbnail_url: Option<String>,
    /// md5 of the last fetched thumbnail bytes; lets us notice re-rendered
    /// thumbnails served under an unchanged URL.
    pub remote_thumbnail_hash: Option<String>,
    pub remote_video_was_deleted: i32,
    pub last_checked: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::video::Entity",
        from = "Column::VideoId",
        to = "super::video::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Video,
}

impl Related<super::video::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Video.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
