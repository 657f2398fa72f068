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
                    .table(BuildLogEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BuildLogEntry::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BuildLogEntry::Submission).uuid().not_null())
                    .col(ColumnDef::new(BuildLogEntry::Position).integer().not_null())
                    .col(ColumnDef::new(BuildLogEntry::Time).date_time().not_null())
                    .col(ColumnDef::new(BuildLogEntry::Log).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-build_log_entry-submission")
                            .from(BuildLogEntry::Table, BuildLogEntry::Submission)
                            .to(Submission::Table, Submission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BuildLogEntry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BuildLogEntry {
    Table,
    Id,
    Submission,
    Position,
    Time,
    Log,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
}
