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
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Feedback::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Feedback::Result).uuid().not_null())
                    .col(ColumnDef::new(Feedback::Position).integer().not_null())
                    .col(ColumnDef::new(Feedback::TestName).string().not_null())
                    .col(ColumnDef::new(Feedback::Positive).boolean().not_null())
                    .col(ColumnDef::new(Feedback::DetailText).text())
                    .col(ColumnDef::new(Feedback::Kind).small_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-feedback-result")
                            .from(Feedback::Table, Feedback::Result)
                            .to(ResultTable::Table, ResultTable::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Feedback {
    Table,
    Id,
    Result,
    Position,
    TestName,
    Positive,
    DetailText,
    Kind,
}

#[derive(DeriveIden)]
enum ResultTable {
    #[sea_orm(iden = "result")]
    Table,
    Id,
}
