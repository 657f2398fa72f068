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
                    .table(Participation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participation::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participation::Exercise).uuid().not_null())
                    .col(ColumnDef::new(Participation::Kind).small_integer().not_null())
                    .col(ColumnDef::new(Participation::BuildPlanId).string())
                    .col(
                        ColumnDef::new(Participation::RepositoryUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participation::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-participation-exercise")
                            .from(Participation::Table, Participation::Exercise)
                            .to(Exercise::Table, Exercise::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-participation-build_plan_id")
                    .table(Participation::Table)
                    .col(Participation::BuildPlanId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Participation {
    Table,
    Id,
    Exercise,
    Kind,
    BuildPlanId,
    RepositoryUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Exercise {
    Table,
    Id,
}
