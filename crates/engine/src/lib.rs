pub use books::{AccountKey, Effect, EntryKind, LedgerBook, SignConvention, normalize_account_name};
pub use clients::Client;
pub use commands::{
    ClientPatch, EntryPatch, NewClientCmd, NewEntryCmd, NewStockCmd, OpeningBalanceCmd, StockPatch,
};
pub use entries::{EntryDetails, LedgerEntry};
pub use error::EngineError;
pub use ledger::AccountTotals;
pub use money::Money;
pub use ops::{
    AccountStatement, AccountSummary, Engine, EngineBuilder, EntryListFilter, EntryOrder,
    FeedPage, ProductSummary, StatusTotals, StockListFilter, StockSummary,
};
pub use payment::{PaymentDetails, PaymentMethod};
pub use stock::{StockCharges, StockEntry, StockStatus};
pub use util::parse_date;

mod books;
mod clients;
pub mod coerce;
mod commands;
mod entries;
mod error;
pub mod ledger;
mod money;
mod ops;
mod payment;
mod stock;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
