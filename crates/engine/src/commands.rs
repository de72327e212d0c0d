//! Command structs for engine operations.
//!
//! These types group parameters for write operations (entries, opening
//! balances, clients, stock lots), keeping call sites readable and avoiding
//! long argument lists. Numeric fields are already coerced; see
//! [`crate::coerce`].

use chrono::NaiveDate;

use crate::{EntryDetails, EntryKind, LedgerBook, Money, PaymentMethod, StockCharges, StockStatus};

/// Create a ledger entry.
///
/// `account` and `date` are optional here so that the engine, not each
/// transport, decides when they are missing.
#[derive(Clone, Debug)]
pub struct NewEntryCmd {
    pub book: LedgerBook,
    pub account: Option<String>,
    pub date: Option<NaiveDate>,
    /// Defaults to the book's default kind.
    pub kind: Option<EntryKind>,
    pub debit: Money,
    pub credit: Money,
    /// Required in the supplier book, zero elsewhere when absent.
    pub amount: Option<Money>,
    pub details: EntryDetails,
}

impl NewEntryCmd {
    #[must_use]
    pub fn new(book: LedgerBook) -> Self {
        Self {
            book,
            account: None,
            date: None,
            kind: None,
            debit: Money::ZERO,
            credit: Money::ZERO,
            amount: None,
            details: EntryDetails::default(),
        }
    }

    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn debit(mut self, debit: Money) -> Self {
        self.debit = debit;
        self
    }

    #[must_use]
    pub fn credit(mut self, credit: Money) -> Self {
        self.credit = credit;
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.details.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn details(mut self, details: EntryDetails) -> Self {
        self.details = details;
        self
    }
}

/// Partial update of a ledger entry.
///
/// `None` leaves a field untouched. For text fields `Some("")` clears the
/// value; for optional dates `Some(None)` does.
#[derive(Clone, Debug, Default)]
pub struct EntryPatch {
    pub account: Option<String>,
    pub date: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub debit: Option<Money>,
    pub credit: Option<Money>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub note: Option<String>,
    pub product_type: Option<String>,
    pub quantity: Option<f64>,
    pub rate: Option<Money>,
    pub loading: Option<Money>,
    pub mdays: Option<i64>,
    pub due_date: Option<Option<NaiveDate>>,
    pub lifting_date: Option<Option<NaiveDate>>,
    /// When present, the payment references are re-normalized for it.
    pub payment_method: Option<PaymentMethod>,
    pub bank_name: Option<String>,
    pub cheque_no: Option<String>,
    pub cheque_date: Option<Option<NaiveDate>>,
    pub transaction_reference: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<Option<NaiveDate>>,
    pub other_expense_name: Option<String>,
    pub other_expense_amount: Option<Money>,
}

impl EntryPatch {
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn debit(mut self, debit: Money) -> Self {
        self.debit = Some(debit);
        self
    }

    #[must_use]
    pub fn credit(mut self, credit: Money) -> Self {
        self.credit = Some(credit);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Replace the opening balance of an account.
#[derive(Clone, Debug)]
pub struct OpeningBalanceCmd {
    pub book: LedgerBook,
    pub account: String,
    pub amount: Money,
    pub note: Option<String>,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

impl OpeningBalanceCmd {
    #[must_use]
    pub fn new(book: LedgerBook, account: impl Into<String>, amount: Money) -> Self {
        Self {
            book,
            account: account.into(),
            amount,
            note: None,
            date: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewClientCmd {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Money,
    pub remarks: Option<String>,
}

impl NewClientCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn opening_balance(mut self, opening_balance: Money) -> Self {
        self.opening_balance = opening_balance;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Option<Money>,
    pub remarks: Option<String>,
}

/// Register a stock lot.
#[derive(Clone, Debug, Default)]
pub struct NewStockCmd {
    pub product_type: Option<String>,
    pub status: Option<StockStatus>,
    pub purchase_date: Option<NaiveDate>,
    pub quantity: f64,
    pub purchase_rate: Money,
    /// When set, a linked supplier `PURCHASE` entry is booked for the lot.
    pub supplier_name: Option<String>,
    pub supplier_invoice_no: Option<String>,
    pub transport_company: Option<String>,
    pub vehicle_number: Option<String>,
    pub warehouse_location: Option<String>,
    pub charges: StockCharges,
    pub other_charges_description: Option<String>,
    pub expected_arrival_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewStockCmd {
    #[must_use]
    pub fn new(
        product_type: impl Into<String>,
        purchase_date: NaiveDate,
        quantity: f64,
        purchase_rate: Money,
    ) -> Self {
        Self {
            product_type: Some(product_type.into()),
            purchase_date: Some(purchase_date),
            quantity,
            purchase_rate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn supplier(mut self, supplier_name: impl Into<String>) -> Self {
        self.supplier_name = Some(supplier_name.into());
        self
    }

    #[must_use]
    pub fn invoice(mut self, invoice_no: impl Into<String>) -> Self {
        self.supplier_invoice_no = Some(invoice_no.into());
        self
    }

    #[must_use]
    pub fn charges(mut self, charges: StockCharges) -> Self {
        self.charges = charges;
        self
    }
}

/// Partial update of a stock lot. The linked supplier entry is not touched.
#[derive(Clone, Debug, Default)]
pub struct StockPatch {
    pub product_type: Option<String>,
    pub status: Option<StockStatus>,
    pub purchase_date: Option<NaiveDate>,
    pub quantity: Option<f64>,
    pub remaining_quantity: Option<f64>,
    pub purchase_rate: Option<Money>,
    pub supplier_name: Option<String>,
    pub supplier_invoice_no: Option<String>,
    pub transport_company: Option<String>,
    pub vehicle_number: Option<String>,
    pub warehouse_location: Option<String>,
    pub loading_charges: Option<Money>,
    pub unloading_charges: Option<Money>,
    pub transport_charges: Option<Money>,
    pub other_charges: Option<Money>,
    pub other_charges_description: Option<String>,
    pub expected_arrival_date: Option<Option<NaiveDate>>,
    pub actual_arrival_date: Option<Option<NaiveDate>>,
    pub unloading_date: Option<Option<NaiveDate>>,
    pub quality_checked: Option<bool>,
    pub quality_remarks: Option<String>,
    pub damaged_quantity: Option<f64>,
    pub notes: Option<String>,
}
