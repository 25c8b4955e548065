//! Create `info` table.
//!
//! Rows are never updated in place; the row with the highest id is the current one.
//! `seed` is TRUE only on the row created from the configured defaults; the
//! unique index lets concurrent seeders race with `ON CONFLICT DO NOTHING`.
//! Other rows leave it NULL, which never conflicts.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Info::Table)
                    .if_not_exists()
                    .col(pk_auto(Info::Id))
                    .col(string_len(Info::Name, 255).not_null())
                    .col(text(Info::Synopsis).not_null())
                    .col(string_len(Info::Version, 64).not_null())
                    .col(string_len(Info::Institution, 255).not_null())
                    .col(timestamp_with_time_zone(Info::ReleaseTime).not_null())
                    .col(string_len(Info::SupportEmail, 255).not_null())
                    .col(string_len(Info::Category, 255).not_null())
                    .col(string_len(Info::ResearchSubject, 255).not_null())
                    .col(text(Info::Tags).not_null())
                    .col(boolean_null(Info::Seed).unique_key())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Info::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Info {
    Table,
    Id,
    Name,
    Synopsis,
    Version,
    Institution,
    ReleaseTime,
    SupportEmail,
    Category,
    ResearchSubject,
    Tags,
    Seed,
}
