pub use sea_orm_migration::prelude::*;

mod m20251101_000000_ledger_entries;
mod m20251101_000100_clients;
mod m20251101_000200_stock;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000000_ledger_entries::Migration),
            Box::new(m20251101_000100_clients::Migration),
            Box::new(m20251101_000200_stock::Migration),
        ]
    }
}
