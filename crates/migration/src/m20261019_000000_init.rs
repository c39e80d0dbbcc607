//! Initial schema migration.
//!
//! Creates the ledger schema:
//!
//! - `donors`: identity and contact data
//! - `donations`: timestamped credits from a donor
//! - `expenditures`: timestamped debits for a cause
//! - `matches`: append-only allocations between the two
//! - `expenditure_media`: ordered media descriptors per expenditure

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Donors {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    DonorId,
    AmountMinor,
    DonatedAt,
    RecordedAt,
}

#[derive(Iden)]
enum Expenditures {
    Table,
    Id,
    AmountMinor,
    Cause,
    Description,
    SpentAt,
    RecordedAt,
}

#[derive(Iden)]
enum Matches {
    Table,
    Id,
    DonationId,
    ExpenditureId,
    AllocatedMinor,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenditureMedia {
    Table,
    Id,
    ExpenditureId,
    Kind,
    Url,
    Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Donors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Donors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Donors::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Donors::Name).string().not_null())
                    .col(ColumnDef::new(Donors::Email).string())
                    .col(ColumnDef::new(Donors::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Donations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::DonorId).string().not_null())
                    .col(
                        ColumnDef::new(Donations::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Donations::AmountMinor).gt(0)),
                    )
                    .col(ColumnDef::new(Donations::DonatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Donations::RecordedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-donor_id")
                            .from(Donations::Table, Donations::DonorId)
                            .to(Donors::Table, Donors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-donated_at")
                    .table(Donations::Table)
                    .col(Donations::DonatedAt)
                    .col(Donations::RecordedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-donor_id")
                    .table(Donations::Table)
                    .col(Donations::DonorId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenditures
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenditures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenditures::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Expenditures::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Expenditures::AmountMinor).gt(0)),
                    )
                    .col(ColumnDef::new(Expenditures::Cause).string().not_null())
                    .col(ColumnDef::new(Expenditures::Description).string())
                    .col(ColumnDef::new(Expenditures::SpentAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Expenditures::RecordedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenditures-spent_at")
                    .table(Expenditures::Table)
                    .col(Expenditures::SpentAt)
                    .col(Expenditures::RecordedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Matches
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Matches::DonationId).string().not_null())
                    .col(ColumnDef::new(Matches::ExpenditureId).string().not_null())
                    .col(
                        ColumnDef::new(Matches::AllocatedMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Matches::AllocatedMinor).gt(0)),
                    )
                    .col(ColumnDef::new(Matches::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-matches-donation_id")
                            .from(Matches::Table, Matches::DonationId)
                            .to(Donations::Table, Donations::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-matches-expenditure_id")
                            .from(Matches::Table, Matches::ExpenditureId)
                            .to(Expenditures::Table, Expenditures::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-matches-donation_id-expenditure_id-unique")
                    .table(Matches::Table)
                    .col(Matches::DonationId)
                    .col(Matches::ExpenditureId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-matches-expenditure_id")
                    .table(Matches::Table)
                    .col(Matches::ExpenditureId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Expenditure media
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenditureMedia::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenditureMedia::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenditureMedia::ExpenditureId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenditureMedia::Kind).string().not_null())
                    .col(ColumnDef::new(ExpenditureMedia::Url).string().not_null())
                    .col(
                        ColumnDef::new(ExpenditureMedia::Position)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenditure_media-expenditure_id")
                            .from(ExpenditureMedia::Table, ExpenditureMedia::ExpenditureId)
                            .to(Expenditures::Table, Expenditures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenditure_media-expenditure_id-position")
                    .table(ExpenditureMedia::Table)
                    .col(ExpenditureMedia::ExpenditureId)
                    .col(ExpenditureMedia::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenditureMedia::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenditures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Donors::Table).to_owned())
            .await?;
        Ok(())
    }
}
