/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub participation: Uuid,
    pub commit_hash: Option<String>,
    pub submission_date: NaiveDateTime,
    pub build_failed: bool,
    /// Created by the ingestion pipeline because no matching submission existed.
    pub fallback: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participation::Entity",
        from = "Column::Participation",
        to = "super::participation::Column::Id",
        on_delete = "Cascade"
    )]
    Participation,
    #[sea_orm(has_one = "super::result::Entity")]
    Result,
    #[sea_orm(has_many = "super::build_log_entry::Entity")]
    BuildLogEntry,
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl Related<super::result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Result.def()
    }
}

impl Related<super::build_log_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuildLogEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
