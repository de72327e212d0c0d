//! Books, entry kinds and account keys.
//!
//! A [`LedgerBook`] is a family of accounts sharing one sign convention. An
//! account is identified by an [`AccountKey`]: the same name in two books is
//! two independent accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBook {
    /// Client ledger: sales to and receipts from clients.
    Client,
    /// Running balance with a person (company balance sheet).
    CompanyBalance,
    /// Supplier ledger: purchases from and payments to suppliers.
    Supplier,
}

impl LedgerBook {
    pub const ALL: [LedgerBook; 3] = [Self::Client, Self::CompanyBalance, Self::Supplier];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::CompanyBalance => "company_balance",
            Self::Supplier => "supplier",
        }
    }

    pub fn convention(self) -> SignConvention {
        match self {
            Self::Client | Self::CompanyBalance => SignConvention::CreditMinusDebit,
            Self::Supplier => SignConvention::Payable,
        }
    }

    /// Kind assigned to new entries that do not name one.
    pub fn default_kind(self) -> EntryKind {
        match self {
            Self::Client => EntryKind::Sale,
            Self::CompanyBalance => EntryKind::Adjustment,
            Self::Supplier => EntryKind::Payment,
        }
    }
}

impl fmt::Display for LedgerBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LedgerBook {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "client" | "ledger" => Ok(Self::Client),
            "company_balance" | "company-balance" => Ok(Self::CompanyBalance),
            "supplier" | "supplier-ledger" | "supplier-payments" => Ok(Self::Supplier),
            other => Err(EngineError::InvalidValue(format!("invalid book: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Opening,
    Purchase,
    Payment,
    Sale,
    Adjustment,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "OPENING",
            Self::Purchase => "PURCHASE",
            Self::Payment => "PAYMENT",
            Self::Sale => "SALE",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OPENING" => Ok(Self::Opening),
            "PURCHASE" => Ok(Self::Purchase),
            "PAYMENT" => Ok(Self::Payment),
            "SALE" => Ok(Self::Sale),
            "ADJUSTMENT" => Ok(Self::Adjustment),
            other => Err(EngineError::InvalidValue(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

/// How an entry moves the running balance of its account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignConvention {
    /// `delta = credit - debit`, whatever the kind.
    CreditMinusDebit,
    /// What is owed to a supplier: `OPENING`/`PURCHASE` add `amount`,
    /// `PAYMENT` subtracts it, other kinds leave the balance alone.
    Payable,
}

/// The money fields an entry contributes to its account balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effect {
    pub debit: Money,
    pub credit: Money,
    pub amount: Money,
}

impl SignConvention {
    /// Signed change of the balance, `None` if it does not fit in an `i64`.
    pub fn delta(self, kind: EntryKind, effect: Effect) -> Option<Money> {
        match self {
            Self::CreditMinusDebit => effect.credit.checked_sub(effect.debit),
            Self::Payable => match kind {
                EntryKind::Opening | EntryKind::Purchase => Some(effect.amount),
                EntryKind::Payment => effect.amount.checked_neg(),
                EntryKind::Sale | EntryKind::Adjustment => Some(Money::ZERO),
            },
        }
    }

    /// Splits a delta into `(increase, decrease)` totals contributions.
    pub fn split(self, kind: EntryKind, effect: Effect) -> (Money, Money) {
        match self {
            Self::CreditMinusDebit => (effect.credit, effect.debit),
            Self::Payable => match kind {
                EntryKind::Opening | EntryKind::Purchase => (effect.amount, Money::ZERO),
                EntryKind::Payment => (Money::ZERO, effect.amount),
                EntryKind::Sale | EntryKind::Adjustment => (Money::ZERO, Money::ZERO),
            },
        }
    }
}

/// Identity of an account: the book plus the normalized account name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountKey {
    pub book: LedgerBook,
    pub name: String,
}

impl AccountKey {
    /// Builds a key from raw input, trimming and NFC-normalizing the name.
    pub fn new(book: LedgerBook, name: &str) -> ResultEngine<Self> {
        Ok(Self {
            book,
            name: normalize_account_name(name)?,
        })
    }

    /// Builds a key from a name already read back from the store.
    pub(crate) fn stored(book: LedgerBook, name: String) -> Self {
        Self { book, name }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.book, self.name)
    }
}

/// Trims and NFC-normalizes an account name; empty names are rejected.
pub fn normalize_account_name(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::MissingField("account".to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(debit: i64, credit: i64, amount: i64) -> Effect {
        Effect {
            debit: Money::new(debit),
            credit: Money::new(credit),
            amount: Money::new(amount),
        }
    }

    #[test]
    fn credit_minus_debit_ignores_kind() {
        let c = SignConvention::CreditMinusDebit;
        assert_eq!(c.delta(EntryKind::Sale, effect(400, 0, 999)), Some(Money::new(-400)));
        assert_eq!(c.delta(EntryKind::Payment, effect(0, 1000, 0)), Some(Money::new(1000)));
    }

    #[test]
    fn payable_uses_amount_by_kind() {
        let c = SignConvention::Payable;
        assert_eq!(c.delta(EntryKind::Opening, effect(0, 0, 5000)), Some(Money::new(5000)));
        assert_eq!(c.delta(EntryKind::Purchase, effect(0, 0, 2000)), Some(Money::new(2000)));
        assert_eq!(c.delta(EntryKind::Payment, effect(0, 0, 3000)), Some(Money::new(-3000)));
        assert_eq!(c.delta(EntryKind::Adjustment, effect(10, 20, 3000)), Some(Money::ZERO));
    }

    #[test]
    fn delta_reports_overflow() {
        assert_eq!(
            SignConvention::CreditMinusDebit.delta(EntryKind::Sale, effect(1, i64::MIN, 0)),
            None
        );
        assert_eq!(
            SignConvention::Payable.delta(EntryKind::Payment, effect(0, 0, i64::MIN)),
            None
        );
    }

    #[test]
    fn account_names_are_trimmed_and_composed() {
        let decomposed = "Cafe\u{301}  ";
        let key = AccountKey::new(LedgerBook::Client, decomposed).unwrap();
        assert_eq!(key.name, "Caf\u{e9}");
        assert_eq!(
            AccountKey::new(LedgerBook::Client, "   "),
            Err(EngineError::MissingField("account".to_string()))
        );
    }

    #[test]
    fn books_parse_from_wire_aliases() {
        assert_eq!(LedgerBook::try_from("ledger").unwrap(), LedgerBook::Client);
        assert_eq!(
            LedgerBook::try_from("company-balance").unwrap(),
            LedgerBook::CompanyBalance
        );
        assert_eq!(
            LedgerBook::try_from("supplier-payments").unwrap(),
            LedgerBook::Supplier
        );
        assert!(LedgerBook::try_from("stock").is_err());
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!(EntryKind::try_from("purchase").unwrap(), EntryKind::Purchase);
        assert!(EntryKind::try_from("REFUND").is_err());
    }
}
