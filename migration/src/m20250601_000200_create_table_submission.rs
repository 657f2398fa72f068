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
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submission::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submission::Participation).uuid().not_null())
                    .col(ColumnDef::new(Submission::CommitHash).string())
                    .col(
                        ColumnDef::new(Submission::SubmissionDate)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submission::BuildFailed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Submission::Fallback)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-participation")
                            .from(Submission::Table, Submission::Participation)
                            .to(Participation::Table, Participation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-submission-participation-commit_hash")
                    .table(Submission::Table)
                    .col(Submission::Participation)
                    .col(Submission::CommitHash)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    Participation,
    CommitHash,
    SubmissionDate,
    BuildFailed,
    Fallback,
}

#[derive(DeriveIden)]
enum Participation {
    Table,
    Id,
}
