//! Meaning entity
//!
//! One numbered sense of a word. The seven marker columns are independent
//! free-text classifications; blank submissions are stored as NULL.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meanings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub word_id: Uuid,

    /// Ordinal among the word's meanings, in submission order
    pub number: i32,

    #[sea_orm(column_type = "Text")]
    pub meaning: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub origin: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub observation: Option<String>,

    /// Cross-reference to another lemma
    #[sea_orm(column_type = "Text", nullable)]
    pub remission: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub grammar_category: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub social_valuation: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub social_stratum: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub style: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub intentionality: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub geography: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub chronology: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub frequency: Option<String>,

    /// Source dictionary tag
    #[sea_orm(column_type = "Text", nullable)]
    pub dictionary: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub variant: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::word::Entity",
        from = "Column::WordId",
        to = "super::word::Column::Id"
    )]
    Word,

    #[sea_orm(has_many = "super::example::Entity", on_delete = "Cascade")]
    Examples,
}

impl Related<super::word::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Word.def()
    }
}

impl Related<super::example::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Examples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
