use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::ResultEngine;

mod clients;
mod entries;
mod feed;
mod locks;
mod recompute;
mod reports;
mod stock;

pub use entries::{EntryListFilter, EntryOrder};
pub use feed::FeedPage;
pub use reports::{AccountStatement, AccountSummary};
pub use stock::{ProductSummary, StatusTotals, StockListFilter, StockSummary};

use locks::AccountLocks;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of the bookkeeping engine.
///
/// Every mutation of a ledger entry commits first and then recomputes the
/// closing balances of the account(s) it touched, while holding the
/// per-account lock for the whole sequence.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: AccountLocks,
    /// Serializes allocation of the global entry `sequence`.
    sequence: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn apply_optional_text_patch(existing: Option<String>, patch: Option<&str>) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(Some(value)),
    }
}

fn apply_optional_date_patch(
    existing: Option<NaiveDate>,
    patch: Option<Option<NaiveDate>>,
) -> Option<NaiveDate> {
    patch.unwrap_or(existing)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            locks: AccountLocks::default(),
            sequence: Mutex::new(()),
        })
    }
}
