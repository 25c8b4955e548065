//! Create `statistic` table.
//!
//! `name` is the primary key so concurrent seeding can rely on
//! `ON CONFLICT DO NOTHING` to create at most one row per counter.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Statistic::Table)
                    .if_not_exists()
                    .col(string_len(Statistic::Name, 128).primary_key())
                    .col(string_len(Statistic::Value, 64).not_null())
                    .col(timestamp_with_time_zone(Statistic::LastReset).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Statistic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Statistic { Table, Name, Value, LastReset }
