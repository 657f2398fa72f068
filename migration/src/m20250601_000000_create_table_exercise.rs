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
                    .table(Exercise::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Exercise::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Exercise::Title).string().not_null())
                    .col(
                        ColumnDef::new(Exercise::ProjectKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Exercise::ProgrammingLanguage)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exercise::DueDate).date_time())
                    .col(
                        ColumnDef::new(Exercise::AllowLateRated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exercise::StaticAnalysisEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exercise::SequentialTestRuns)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exercise::TestRepositoryUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exercise::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exercise::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Exercise {
    Table,
    Id,
    Title,
    ProjectKey,
    ProgrammingLanguage,
    DueDate,
    AllowLateRated,
    StaticAnalysisEnabled,
    SequentialTestRuns,
    TestRepositoryUrl,
    CreatedAt,
}
