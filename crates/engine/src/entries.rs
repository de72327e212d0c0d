//! Ledger entries.
//!
//! A `LedgerEntry` is one dated movement on one account. Everything except
//! the kind and the debit/credit/amount triple is opaque to balance replay
//! and lives in [`EntryDetails`].

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{
    AccountKey, EngineError, EntryKind, LedgerBook, Money, PaymentDetails, PaymentMethod,
    ResultEngine, books::Effect, util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account: AccountKey,
    pub date: NaiveDate,
    /// Global insertion order, the tie-breaker for entries sharing a date.
    pub sequence: i64,
    pub kind: EntryKind,
    pub debit: Money,
    pub credit: Money,
    pub amount: Money,
    /// Running balance after this entry. Rewritten by every recompute.
    pub closing_balance: Money,
    pub details: EntryDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn effect(&self) -> Effect {
        Effect {
            debit: self.debit,
            credit: self.credit,
            amount: self.amount,
        }
    }

    /// Signed change this entry applies to its account balance.
    pub fn delta(&self) -> Option<Money> {
        self.account
            .book
            .convention()
            .delta(self.kind, self.effect())
    }

    /// Rejects money fields larger than [`Money::MAX`].
    pub fn check_limits(&self) -> ResultEngine<()> {
        let fields = [
            ("debit", self.debit),
            ("credit", self.credit),
            ("amount", self.amount),
            ("rate", self.details.rate),
            ("loading", self.details.loading),
            ("other_expense_amount", self.details.other_expense_amount),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_within_limit()) {
            Some((field, _)) => Err(EngineError::InvalidValue(format!("{field} out of range"))),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryDetails {
    pub description: Option<String>,
    pub note: Option<String>,
    pub product_type: Option<String>,
    pub quantity: f64,
    pub rate: Money,
    pub loading: Money,
    pub mdays: i64,
    pub due_date: Option<NaiveDate>,
    pub lifting_date: Option<NaiveDate>,
    pub payment: PaymentDetails,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub other_expense_name: Option<String>,
    pub other_expense_amount: Money,
    pub stock_entry_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub book: String,
    pub account: String,
    pub date: Date,
    pub sequence: i64,
    pub kind: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub amount_minor: i64,
    pub closing_balance_minor: i64,
    pub description: Option<String>,
    pub note: Option<String>,
    pub product_type: Option<String>,
    pub quantity: f64,
    pub rate_minor: i64,
    pub loading_minor: i64,
    pub mdays: i64,
    pub due_date: Option<Date>,
    pub lifting_date: Option<Date>,
    pub payment_method: Option<String>,
    pub bank_name: Option<String>,
    pub cheque_no: Option<String>,
    pub cheque_date: Option<Date>,
    pub transaction_reference: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<Date>,
    pub other_expense_name: Option<String>,
    pub other_expense_amount_minor: i64,
    pub stock_entry_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        let details = &entry.details;
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            book: ActiveValue::Set(entry.account.book.as_str().to_string()),
            account: ActiveValue::Set(entry.account.name.clone()),
            date: ActiveValue::Set(entry.date),
            sequence: ActiveValue::Set(entry.sequence),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            debit_minor: ActiveValue::Set(entry.debit.minor()),
            credit_minor: ActiveValue::Set(entry.credit.minor()),
            amount_minor: ActiveValue::Set(entry.amount.minor()),
            closing_balance_minor: ActiveValue::Set(entry.closing_balance.minor()),
            description: ActiveValue::Set(details.description.clone()),
            note: ActiveValue::Set(details.note.clone()),
            product_type: ActiveValue::Set(details.product_type.clone()),
            quantity: ActiveValue::Set(details.quantity),
            rate_minor: ActiveValue::Set(details.rate.minor()),
            loading_minor: ActiveValue::Set(details.loading.minor()),
            mdays: ActiveValue::Set(details.mdays),
            due_date: ActiveValue::Set(details.due_date),
            lifting_date: ActiveValue::Set(details.lifting_date),
            payment_method: ActiveValue::Set(
                details.payment.method.map(|m| m.as_str().to_string()),
            ),
            bank_name: ActiveValue::Set(details.payment.bank_name.clone()),
            cheque_no: ActiveValue::Set(details.payment.cheque_no.clone()),
            cheque_date: ActiveValue::Set(details.payment.cheque_date),
            transaction_reference: ActiveValue::Set(
                details.payment.transaction_reference.clone(),
            ),
            invoice_number: ActiveValue::Set(details.invoice_number.clone()),
            invoice_date: ActiveValue::Set(details.invoice_date),
            other_expense_name: ActiveValue::Set(details.other_expense_name.clone()),
            other_expense_amount_minor: ActiveValue::Set(details.other_expense_amount.minor()),
            stock_entry_id: ActiveValue::Set(details.stock_entry_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(entry.created_at),
            updated_at: ActiveValue::Set(entry.updated_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let book = LedgerBook::try_from(model.book.as_str())?;
        let payment = PaymentDetails {
            method: model
                .payment_method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            bank_name: model.bank_name,
            cheque_no: model.cheque_no,
            cheque_date: model.cheque_date,
            transaction_reference: model.transaction_reference,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "entry")?,
            account: AccountKey::stored(book, model.account),
            date: model.date,
            sequence: model.sequence,
            kind: EntryKind::try_from(model.kind.as_str())?,
            debit: Money::new(model.debit_minor),
            credit: Money::new(model.credit_minor),
            amount: Money::new(model.amount_minor),
            closing_balance: Money::new(model.closing_balance_minor),
            details: EntryDetails {
                description: model.description,
                note: model.note,
                product_type: model.product_type,
                quantity: model.quantity,
                rate: Money::new(model.rate_minor),
                loading: Money::new(model.loading_minor),
                mdays: model.mdays,
                due_date: model.due_date,
                lifting_date: model.lifting_date,
                payment,
                invoice_number: model.invoice_number,
                invoice_date: model.invoice_date,
                other_expense_name: model.other_expense_name,
                other_expense_amount: Money::new(model.other_expense_amount_minor),
                stock_entry_id: model
                    .stock_entry_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "stock entry"))
                    .transpose()?,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
