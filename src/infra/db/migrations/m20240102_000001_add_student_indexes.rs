//! Migration: Add indexes backing the staff list filters.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_students_table::Students;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: &[(&str, Students)] = &[
    ("idx_students_level", Students::Level),
    ("idx_students_faculty", Students::Faculty),
    ("idx_students_is_draft", Students::IsDraft),
    ("idx_students_created_at", Students::CreatedAt),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(*name)
                        .table(Students::Table)
                        .col(*column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in INDEXES {
            manager
                .drop_index(
                    Index::drop()
                        .name(*name)
                        .table(Students::Table)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
