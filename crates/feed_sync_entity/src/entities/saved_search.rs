//! Saved-search source configuration: a query string polled against the
//! configured search providers.

use sea_orm::entity::prelude::*;

use crate::custom_type::StringVec;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_search")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub query_string: String,
    pub auto_approve: bool,
    pub auto_update: bool,
    pub auto_authors: Option<StringVec>,
    pub auto_categories: Option<StringVec>,
    pub when_created: DateTime,
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
