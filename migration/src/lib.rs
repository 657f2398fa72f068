/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20250601_000000_create_table_exercise;
mod m20250601_000100_create_table_participation;
mod m20250601_000200_create_table_submission;
mod m20250601_000300_create_table_result;
mod m20250601_000400_create_table_feedback;
mod m20250601_000500_create_table_build_log_entry;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000000_create_table_exercise::Migration),
            Box::new(m20250601_000100_create_table_participation::Migration),
            Box::new(m20250601_000200_create_table_submission::Migration),
            Box::new(m20250601_000300_create_table_result::Migration),
            Box::new(m20250601_000400_create_table_feedback::Migration),
            Box::new(m20250601_000500_create_table_build_log_entry::Migration),
        ]
    }
}
