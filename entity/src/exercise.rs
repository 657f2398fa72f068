/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgrammingLanguage {
    #[sea_orm(num_value = 0)]
    Java,
    #[sea_orm(num_value = 1)]
    Kotlin,
    #[sea_orm(num_value = 2)]
    Python,
    #[sea_orm(num_value = 3)]
    C,
    #[sea_orm(num_value = 4)]
    Haskell,
    #[sea_orm(num_value = 5)]
    Swift,
    #[sea_orm(num_value = 6)]
    Ocaml,
    #[sea_orm(num_value = 7)]
    Assembler,
    #[sea_orm(num_value = 8)]
    Vhdl,
    #[sea_orm(num_value = 9)]
    Empty,
}

impl fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgrammingLanguage::Java => "JAVA",
            ProgrammingLanguage::Kotlin => "KOTLIN",
            ProgrammingLanguage::Python => "PYTHON",
            ProgrammingLanguage::C => "C",
            ProgrammingLanguage::Haskell => "HASKELL",
            ProgrammingLanguage::Swift => "SWIFT",
            ProgrammingLanguage::Ocaml => "OCAML",
            ProgrammingLanguage::Assembler => "ASSEMBLER",
            ProgrammingLanguage::Vhdl => "VHDL",
            ProgrammingLanguage::Empty => "EMPTY",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for ProgrammingLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JAVA" => Ok(ProgrammingLanguage::Java),
            "KOTLIN" => Ok(ProgrammingLanguage::Kotlin),
            "PYTHON" => Ok(ProgrammingLanguage::Python),
            "C" => Ok(ProgrammingLanguage::C),
            "HASKELL" => Ok(ProgrammingLanguage::Haskell),
            "SWIFT" => Ok(ProgrammingLanguage::Swift),
            "OCAML" => Ok(ProgrammingLanguage::Ocaml),
            "ASSEMBLER" => Ok(ProgrammingLanguage::Assembler),
            "VHDL" => Ok(ProgrammingLanguage::Vhdl),
            "EMPTY" => Ok(ProgrammingLanguage::Empty),
            _ => Err(format!("unknown programming language: {}", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "exercise")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub title: String,
    pub project_key: String,
    pub programming_language: ProgrammingLanguage,
    pub due_date: Option<NaiveDateTime>,
    pub allow_late_rated: bool,
    pub static_analysis_enabled: bool,
    pub sequential_test_runs: bool,
    pub test_repository_url: String,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participation::Entity")]
    Participation,
}

impl Related<super::participation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
