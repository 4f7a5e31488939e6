//! Example entity
//!
//! A quotation attesting one meaning, with bibliographic metadata. Only the
//! quotation text is required.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "examples")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub meaning_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub quotation: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub author: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub year: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub publication: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub format: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub date: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub city: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub editorial: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub volume: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub number: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub page: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub doi: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meaning::Entity",
        from = "Column::MeaningId",
        to = "super::meaning::Column::Id"
    )]
    Meaning,
}

impl Related<super::meaning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meaning.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
