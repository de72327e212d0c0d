//! Conversions between the JSON wire types and the engine types.
//!
//! Numeric fields go through [`engine::coerce`]; dates through
//! [`engine::parse_date`]. An empty string means "no value" for optional
//! text and dates.

use api_types::{
    account::{AccountStatementView, AccountSummaryView, AccountTotalsView},
    client::ClientView,
    entry::EntryView,
    stock::{ProductSummaryView, StatusTotalsView, StockSummaryView, StockView},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use engine::{
    AccountStatement, AccountSummary, AccountTotals, Client, EntryKind, LedgerBook, LedgerEntry,
    PaymentMethod, StatusTotals, StockEntry, StockStatus, StockSummary, coerce, parse_date,
};
use serde_json::Value;

use crate::ServerError;

pub(crate) fn book(value: &str) -> Result<LedgerBook, ServerError> {
    Ok(LedgerBook::try_from(value)?)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn date(value: Option<&str>) -> Result<Option<NaiveDate>, ServerError> {
    Ok(non_empty(value).map(parse_date).transpose()?)
}

/// `None` when absent, `Some(None)` when cleared with an empty string.
pub(crate) fn date_patch(value: Option<&str>) -> Result<Option<Option<NaiveDate>>, ServerError> {
    match value {
        None => Ok(None),
        Some(value) => date(Some(value)).map(Some),
    }
}

pub(crate) fn kind(value: Option<&str>) -> Result<Option<EntryKind>, ServerError> {
    Ok(non_empty(value).map(EntryKind::try_from).transpose()?)
}

pub(crate) fn payment_method(value: Option<&str>) -> Result<Option<PaymentMethod>, ServerError> {
    Ok(non_empty(value).map(PaymentMethod::try_from).transpose()?)
}

pub(crate) fn status(value: Option<&str>) -> Result<Option<StockStatus>, ServerError> {
    Ok(non_empty(value).map(StockStatus::try_from).transpose()?)
}

pub(crate) fn money(value: Option<&Value>) -> engine::Money {
    coerce::coerce_amount(value)
}

/// Coerces a numeric field only when it was part of the request.
pub(crate) fn money_patch(value: Option<&Value>) -> Option<engine::Money> {
    value.map(|v| coerce::coerce_amount(Some(v)))
}

pub(crate) fn number_patch(value: Option<&Value>) -> Option<f64> {
    value.map(|v| coerce::coerce_number(Some(v)))
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn day(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn entry_view(entry: &LedgerEntry) -> EntryView {
    let details = &entry.details;
    EntryView {
        id: entry.id,
        book: entry.account.book.as_str().to_string(),
        account: entry.account.name.clone(),
        date: day(entry.date),
        sequence: entry.sequence,
        kind: entry.kind.as_str().to_string(),
        debit_minor: entry.debit.minor(),
        credit_minor: entry.credit.minor(),
        amount_minor: entry.amount.minor(),
        closing_balance_minor: entry.closing_balance.minor(),
        description: details.description.clone(),
        note: details.note.clone(),
        product_type: details.product_type.clone(),
        quantity: details.quantity,
        rate_minor: details.rate.minor(),
        loading_minor: details.loading.minor(),
        mdays: details.mdays,
        due_date: details.due_date.map(day),
        lifting_date: details.lifting_date.map(day),
        payment_method: details.payment.method.map(|m| m.as_str().to_string()),
        bank_name: details.payment.bank_name.clone(),
        cheque_no: details.payment.cheque_no.clone(),
        cheque_date: details.payment.cheque_date.map(day),
        transaction_reference: details.payment.transaction_reference.clone(),
        invoice_number: details.invoice_number.clone(),
        invoice_date: details.invoice_date.map(day),
        other_expense_name: details.other_expense_name.clone(),
        other_expense_amount_minor: details.other_expense_amount.minor(),
        stock_entry_id: details.stock_entry_id,
        created_at: timestamp(entry.created_at),
        updated_at: timestamp(entry.updated_at),
    }
}

fn totals_view(totals: &AccountTotals) -> AccountTotalsView {
    AccountTotalsView {
        entry_count: totals.entry_count,
        opening_balance_minor: totals.opening_balance.minor(),
        total_increase_minor: totals.total_increase.minor(),
        total_decrease_minor: totals.total_decrease.minor(),
        closing_balance_minor: totals.closing_balance.minor(),
    }
}

pub(crate) fn statement_view(statement: &AccountStatement) -> AccountStatementView {
    AccountStatementView {
        book: statement.account.book.as_str().to_string(),
        account: statement.account.name.clone(),
        entries: statement.entries.iter().map(entry_view).collect(),
        totals: totals_view(&statement.totals),
    }
}

pub(crate) fn summary_view(summary: &AccountSummary) -> AccountSummaryView {
    AccountSummaryView {
        account: summary.account.name.clone(),
        totals: totals_view(&summary.totals),
    }
}

pub(crate) fn client_view(client: &Client) -> ClientView {
    ClientView {
        id: client.id,
        name: client.name.clone(),
        phone: client.phone.clone(),
        address: client.address.clone(),
        opening_balance_minor: client.opening_balance.minor(),
        remarks: client.remarks.clone(),
        created_at: timestamp(client.created_at),
        updated_at: timestamp(client.updated_at),
    }
}

pub(crate) fn stock_view(lot: &StockEntry) -> StockView {
    StockView {
        id: lot.id,
        product_type: lot.product_type.clone(),
        status: lot.status.as_str().to_string(),
        purchase_date: day(lot.purchase_date),
        quantity: lot.quantity,
        remaining_quantity: lot.remaining_quantity,
        purchase_rate_minor: lot.purchase_rate.minor(),
        supplier_name: lot.supplier_name.clone(),
        supplier_invoice_no: lot.supplier_invoice_no.clone(),
        transport_company: lot.transport_company.clone(),
        vehicle_number: lot.vehicle_number.clone(),
        warehouse_location: lot.warehouse_location.clone(),
        loading_charges_minor: lot.charges.loading.minor(),
        unloading_charges_minor: lot.charges.unloading.minor(),
        transport_charges_minor: lot.charges.transport.minor(),
        other_charges_minor: lot.charges.other.minor(),
        other_charges_description: lot.other_charges_description.clone(),
        expected_arrival_date: lot.expected_arrival_date.map(day),
        actual_arrival_date: lot.actual_arrival_date.map(day),
        unloading_date: lot.unloading_date.map(day),
        quality_checked: lot.quality_checked,
        quality_remarks: lot.quality_remarks.clone(),
        damaged_quantity: lot.damaged_quantity,
        notes: lot.notes.clone(),
        supplier_entry_id: lot.supplier_entry_id,
        total_cost_minor: lot.total_cost().minor(),
        created_at: timestamp(lot.created_at),
        updated_at: timestamp(lot.updated_at),
    }
}

fn status_totals_view(totals: &StatusTotals) -> StatusTotalsView {
    StatusTotalsView {
        quantity: totals.quantity,
        value_minor: totals.value.minor(),
    }
}

pub(crate) fn stock_summary_view(summary: &StockSummary) -> StockSummaryView {
    StockSummaryView {
        booked: status_totals_view(&summary.booked),
        on_way: status_totals_view(&summary.on_way),
        unloaded: status_totals_view(&summary.unloaded),
        available: status_totals_view(&summary.available),
        total: status_totals_view(&summary.total),
        manual_paid_minor: summary.manual_paid.minor(),
        by_product: summary
            .by_product
            .iter()
            .map(|(product, p)| {
                (
                    product.clone(),
                    ProductSummaryView {
                        total_purchased: p.total_purchased,
                        remaining: p.remaining,
                        sold: p.sold,
                        purchase_value_minor: p.purchase_value.minor(),
                        remaining_value_minor: p.remaining_value.minor(),
                    },
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dates_clear() {
        assert_eq!(date_patch(None).unwrap(), None);
        assert_eq!(date_patch(Some("")).unwrap(), Some(None));
        assert_eq!(
            date_patch(Some("2024-01-03")).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 3))
        );
        assert!(date(Some("03/01/2024")).is_err());
    }

    #[test]
    fn null_patch_coerces_to_zero() {
        assert_eq!(money_patch(None), None);
        assert_eq!(money_patch(Some(&Value::Null)), Some(engine::Money::ZERO));
        assert_eq!(
            money_patch(Some(&Value::from("12.5"))),
            Some(engine::Money::new(1250))
        );
    }

    #[test]
    fn unknown_book_is_rejected() {
        assert!(matches!(
            book("savings"),
            Err(ServerError::Engine(engine::EngineError::InvalidValue(_)))
        ));
        assert_eq!(book("supplier-ledger").unwrap(), LedgerBook::Supplier);
    }
}
