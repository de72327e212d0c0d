//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`MissingField`] / [`InvalidValue`] for rejected input.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`PartialRecompute`] thrown when a balance recompute stopped midway.
//! - [`Database`] when the store itself fails.
//!
//!  [`MissingField`]: EngineError::MissingField
//!  [`InvalidValue`]: EngineError::InvalidValue
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`PartialRecompute`]: EngineError::PartialRecompute
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::AccountKey;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    /// Persisting closing balances failed after `last_updated`.
    ///
    /// Entries up to `last_updated` carry correct balances; `failed_entry` and
    /// everything after it may be stale until the account is recomputed again.
    #[error(
        "recompute of {account} stopped at entry {failed_entry} (last updated: {})",
        display_last_updated(.last_updated)
    )]
    PartialRecompute {
        account: AccountKey,
        failed_entry: Uuid,
        last_updated: Option<Uuid>,
        #[source]
        source: DbErr,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

fn display_last_updated(last_updated: &Option<Uuid>) -> String {
    last_updated.map_or_else(|| "none".to_string(), |id| id.to_string())
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (
                Self::PartialRecompute {
                    account: a1,
                    failed_entry: f1,
                    last_updated: l1,
                    ..
                },
                Self::PartialRecompute {
                    account: a2,
                    failed_entry: f2,
                    last_updated: l2,
                    ..
                },
            ) => a1 == a2 && f1 == f2 && l1 == l2,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
