//! Stock register schema.
//!
//! - `stock_entries`: purchased lots and their logistics status.
//! - `stock_settings`: single-row table (`id = 1`) with the manually entered
//!   total paid amount.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum StockEntries {
    Table,
    Id,
    ProductType,
    Status,
    PurchaseDate,
    Quantity,
    RemainingQuantity,
    PurchaseRateMinor,
    SupplierName,
    SupplierInvoiceNo,
    TransportCompany,
    VehicleNumber,
    WarehouseLocation,
    LoadingChargesMinor,
    UnloadingChargesMinor,
    TransportChargesMinor,
    OtherChargesMinor,
    OtherChargesDescription,
    ExpectedArrivalDate,
    ActualArrivalDate,
    UnloadingDate,
    QualityChecked,
    QualityRemarks,
    DamagedQuantity,
    Notes,
    SupplierEntryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum StockSettings {
    Table,
    Id,
    ManualPaidMinor,
    UpdatedAt,
}

fn charge(col: StockEntries) -> ColumnDef {
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
                    .table(StockEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockEntries::ProductType).string().not_null())
                    .col(
                        ColumnDef::new(StockEntries::Status)
                            .string()
                            .not_null()
                            .default("BOOKED"),
                    )
                    .col(ColumnDef::new(StockEntries::PurchaseDate).date().not_null())
                    .col(ColumnDef::new(StockEntries::Quantity).double().not_null())
                    .col(
                        ColumnDef::new(StockEntries::RemainingQuantity)
                            .double()
                            .not_null(),
                    )
                    .col(charge(StockEntries::PurchaseRateMinor))
                    .col(ColumnDef::new(StockEntries::SupplierName).string())
                    .col(ColumnDef::new(StockEntries::SupplierInvoiceNo).string())
                    .col(ColumnDef::new(StockEntries::TransportCompany).string())
                    .col(ColumnDef::new(StockEntries::VehicleNumber).string())
                    .col(ColumnDef::new(StockEntries::WarehouseLocation).string())
                    .col(charge(StockEntries::LoadingChargesMinor))
                    .col(charge(StockEntries::UnloadingChargesMinor))
                    .col(charge(StockEntries::TransportChargesMinor))
                    .col(charge(StockEntries::OtherChargesMinor))
                    .col(ColumnDef::new(StockEntries::OtherChargesDescription).string())
                    .col(ColumnDef::new(StockEntries::ExpectedArrivalDate).date())
                    .col(ColumnDef::new(StockEntries::ActualArrivalDate).date())
                    .col(ColumnDef::new(StockEntries::UnloadingDate).date())
                    .col(
                        ColumnDef::new(StockEntries::QualityChecked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(StockEntries::QualityRemarks).string())
                    .col(
                        ColumnDef::new(StockEntries::DamagedQuantity)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(StockEntries::Notes).string())
                    .col(ColumnDef::new(StockEntries::SupplierEntryId).string())
                    .col(
                        ColumnDef::new(StockEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockEntries::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_entries-status")
                    .table(StockEntries::Table)
                    .col(StockEntries::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StockSettings::ManualPaidMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StockSettings::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}
