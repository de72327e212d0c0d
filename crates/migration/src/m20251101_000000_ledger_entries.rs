//! Ledger entries schema.
//!
//! A single table holds the entries of every book (client ledger, company
//! balance, supplier ledger). An account is the pair `(book, account)`.
//!
//! - `sequence` is the global insertion order, used to break ties between
//!   entries sharing the same `date`.
//! - `closing_balance_minor` is derived data, rewritten by every recompute.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Id,
    Book,
    Account,
    Date,
    Sequence,
    Kind,
    DebitMinor,
    CreditMinor,
    AmountMinor,
    ClosingBalanceMinor,
    Description,
    Note,
    ProductType,
    Quantity,
    RateMinor,
    LoadingMinor,
    Mdays,
    DueDate,
    LiftingDate,
    PaymentMethod,
    BankName,
    ChequeNo,
    ChequeDate,
    TransactionReference,
    InvoiceNumber,
    InvoiceDate,
    OtherExpenseName,
    OtherExpenseAmountMinor,
    StockEntryId,
    CreatedAt,
    UpdatedAt,
}

fn money(col: LedgerEntries) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Book).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Account).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Date).date().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::Sequence)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(money(LedgerEntries::DebitMinor))
                    .col(money(LedgerEntries::CreditMinor))
                    .col(money(LedgerEntries::AmountMinor))
                    .col(money(LedgerEntries::ClosingBalanceMinor))
                    .col(ColumnDef::new(LedgerEntries::Description).string())
                    .col(ColumnDef::new(LedgerEntries::Note).string())
                    .col(ColumnDef::new(LedgerEntries::ProductType).string())
                    .col(
                        ColumnDef::new(LedgerEntries::Quantity)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(money(LedgerEntries::RateMinor))
                    .col(money(LedgerEntries::LoadingMinor))
                    .col(
                        ColumnDef::new(LedgerEntries::Mdays)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LedgerEntries::DueDate).date())
                    .col(ColumnDef::new(LedgerEntries::LiftingDate).date())
                    .col(ColumnDef::new(LedgerEntries::PaymentMethod).string())
                    .col(ColumnDef::new(LedgerEntries::BankName).string())
                    .col(ColumnDef::new(LedgerEntries::ChequeNo).string())
                    .col(ColumnDef::new(LedgerEntries::ChequeDate).date())
                    .col(ColumnDef::new(LedgerEntries::TransactionReference).string())
                    .col(ColumnDef::new(LedgerEntries::InvoiceNumber).string())
                    .col(ColumnDef::new(LedgerEntries::InvoiceDate).date())
                    .col(ColumnDef::new(LedgerEntries::OtherExpenseName).string())
                    .col(money(LedgerEntries::OtherExpenseAmountMinor))
                    .col(ColumnDef::new(LedgerEntries::StockEntryId).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-sequence-unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-book-account-date-sequence")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Book)
                    .col(LedgerEntries::Account)
                    .col(LedgerEntries::Date)
                    .col(LedgerEntries::Sequence)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-book-created_at")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::Book)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-stock_entry_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::StockEntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}
