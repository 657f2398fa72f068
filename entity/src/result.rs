/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeriveActiveEnum, EnumIter, Deserialize, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
pub enum AssessmentType {
    #[sea_orm(num_value = 0)]
    Automatic,
    #[sea_orm(num_value = 1)]
    SemiAutomatic,
    #[sea_orm(num_value = 2)]
    Manual,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub submission: Uuid,
    pub participation: Uuid,
    pub assessment_type: AssessmentType,
    pub successful: bool,
    pub rated: bool,
    pub completion_date: NaiveDateTime,
    pub build_number: Option<i64>,
    pub test_case_count: i32,
    pub passed_test_case_count: i32,
    pub code_issue_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submission::Entity",
        from = "Column::Submission",
        to = "super::submission::Column::Id",
        on_delete = "Cascade"
    )]
    Submission,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
