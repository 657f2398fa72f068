/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResultTable::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ResultTable::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(ResultTable::Submission)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ResultTable::Participation).uuid().not_null())
                    .col(
                        ColumnDef::new(ResultTable::AssessmentType)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultTable::Successful).boolean().not_null())
                    .col(ColumnDef::new(ResultTable::Rated).boolean().not_null())
                    .col(ColumnDef::new(ResultTable::CompletionDate).date_time().not_null())
                    .col(ColumnDef::new(ResultTable::BuildNumber).big_integer())
                    .col(ColumnDef::new(ResultTable::TestCaseCount).integer().not_null())
                    .col(
                        ColumnDef::new(ResultTable::PassedTestCaseCount)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResultTable::CodeIssueCount).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-result-submission")
                            .from(ResultTable::Table, ResultTable::Submission)
                            .to(Submission::Table, Submission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-result-participation")
                            .from(ResultTable::Table, ResultTable::Participation)
                            .to(Participation::Table, Participation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResultTable::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResultTable {
    #[sea_orm(iden = "result")]
    Table,
    Id,
    Submission,
    Participation,
    AssessmentType,
    Successful,
    Rated,
    CompletionDate,
    BuildNumber,
    TestCaseCount,
    PassedTestCaseCount,
    CodeIssueCount,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Participation {
    Table,
    Id,
}
