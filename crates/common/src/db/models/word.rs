//! Word entity
//!
//! A word is the dictionary headword plus workflow bookkeeping. Meanings and
//! notes hang off it with cascade delete at the schema level.

use crate::search::WordStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "words")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Canonical headword, unique across the dictionary
    #[sea_orm(column_type = "Text", unique)]
    pub lemma: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub root: Option<String>,

    /// Single dictionary letter the word files under
    #[sea_orm(column_type = "Text")]
    pub letter: String,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub created_by: Option<Uuid>,

    pub assigned_to: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the workflow status as an enum
    pub fn word_status(&self) -> Option<WordStatus> {
        WordStatus::parse(&self.status)
    }

    /// Visible on the public surface?
    pub fn is_published(&self) -> bool {
        self.word_status() == Some(WordStatus::Published)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meaning::Entity", on_delete = "Cascade")]
    Meanings,

    #[sea_orm(has_many = "super::note::Entity", on_delete = "Cascade")]
    Notes,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id"
    )]
    Assignee,
}

impl Related<super::meaning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meanings.def()
    }
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
