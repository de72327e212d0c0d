use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Keeps an explicit `null` apart from a missing field.
///
/// Use with `#[serde(default, deserialize_with = "present")]`: a missing
/// field stays `None`, any present value (`null` included) becomes `Some`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub mod entry {
    use super::*;

    /// Request body for creating an entry.
    ///
    /// Numeric fields accept numbers, numeric strings or anything else
    /// (coerced to 0). `closing_balance` is never read from the caller.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryNew {
        pub account: Option<String>,
        /// `YYYY-MM-DD` or an RFC 3339 timestamp.
        pub date: Option<String>,
        pub kind: Option<String>,
        #[serde(default)]
        pub debit: Option<Value>,
        #[serde(default)]
        pub credit: Option<Value>,
        /// Required in the supplier book.
        #[serde(default)]
        pub amount: Option<Value>,
        pub description: Option<String>,
        pub note: Option<String>,
        pub product_type: Option<String>,
        #[serde(default)]
        pub quantity: Option<Value>,
        #[serde(default)]
        pub rate: Option<Value>,
        #[serde(default)]
        pub loading: Option<Value>,
        #[serde(default)]
        pub mdays: Option<Value>,
        pub due_date: Option<String>,
        pub lifting_date: Option<String>,
        pub payment_method: Option<String>,
        pub bank_name: Option<String>,
        pub cheque_no: Option<String>,
        pub cheque_date: Option<String>,
        pub transaction_reference: Option<String>,
        pub invoice_number: Option<String>,
        pub invoice_date: Option<String>,
        pub other_expense_name: Option<String>,
        #[serde(default)]
        pub other_expense_amount: Option<Value>,
    }

    /// Request body for a partial entry update.
    ///
    /// Absent fields are left untouched. A present numeric field is coerced,
    /// so an explicit `null` sets it to 0. An empty string clears an
    /// optional text or date field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub account: Option<String>,
        pub date: Option<String>,
        pub kind: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub debit: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub credit: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub amount: Option<Value>,
        pub description: Option<String>,
        pub note: Option<String>,
        pub product_type: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub quantity: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub rate: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub loading: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub mdays: Option<Value>,
        pub due_date: Option<String>,
        pub lifting_date: Option<String>,
        pub payment_method: Option<String>,
        pub bank_name: Option<String>,
        pub cheque_no: Option<String>,
        pub cheque_date: Option<String>,
        pub transaction_reference: Option<String>,
        pub invoice_number: Option<String>,
        pub invoice_date: Option<String>,
        pub other_expense_name: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub other_expense_amount: Option<Value>,
    }

    /// Request body for setting the "other expense" pair of an entry.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryExpense {
        pub other_expense_name: Option<String>,
        #[serde(default)]
        pub other_expense_amount: Option<Value>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: Uuid,
        pub book: String,
        pub account: String,
        pub date: String,
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
        pub due_date: Option<String>,
        pub lifting_date: Option<String>,
        pub payment_method: Option<String>,
        pub bank_name: Option<String>,
        pub cheque_no: Option<String>,
        pub cheque_date: Option<String>,
        pub transaction_reference: Option<String>,
        pub invoice_number: Option<String>,
        pub invoice_date: Option<String>,
        pub other_expense_name: Option<String>,
        pub other_expense_amount_minor: i64,
        pub stock_entry_id: Option<Uuid>,
        /// RFC 3339, UTC.
        pub created_at: String,
        pub updated_at: String,
    }

    /// Query string of the entry listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryListQuery {
        pub account: Option<String>,
        pub from: Option<String>,
        pub to: Option<String>,
        pub kind: Option<String>,
        /// `date` (default), `account` or `newest`.
        pub order: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FeedQuery {
        pub limit: Option<u64>,
        /// Opaque pagination cursor, from `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedResponse {
        pub entries: Vec<EntryView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod account {
    use super::*;
    use crate::entry::EntryView;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountTotalsView {
        pub entry_count: u64,
        pub opening_balance_minor: i64,
        pub total_increase_minor: i64,
        pub total_decrease_minor: i64,
        pub closing_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountStatementView {
        pub book: String,
        pub account: String,
        pub entries: Vec<EntryView>,
        pub totals: AccountTotalsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountSummaryView {
        pub account: String,
        pub totals: AccountTotalsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountSummaryView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct OpeningBalanceSet {
        pub account: Option<String>,
        #[serde(default)]
        pub amount: Option<Value>,
        pub note: Option<String>,
        /// Defaults to today.
        pub date: Option<String>,
    }
}

pub mod client {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientNew {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub address: Option<String>,
        #[serde(default)]
        pub opening_balance: Option<Value>,
        pub remarks: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientUpdate {
        pub name: Option<String>,
        pub phone: Option<String>,
        pub address: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub opening_balance: Option<Value>,
        pub remarks: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientView {
        pub id: Uuid,
        pub name: String,
        pub phone: Option<String>,
        pub address: Option<String>,
        pub opening_balance_minor: i64,
        pub remarks: Option<String>,
        pub created_at: String,
        pub updated_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientListResponse {
        pub clients: Vec<ClientView>,
    }
}

pub mod stock {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StockNew {
        pub product_type: Option<String>,
        pub status: Option<String>,
        pub purchase_date: Option<String>,
        #[serde(default)]
        pub quantity: Option<Value>,
        #[serde(default)]
        pub purchase_rate: Option<Value>,
        /// When set, a linked supplier purchase is booked.
        pub supplier_name: Option<String>,
        pub supplier_invoice_no: Option<String>,
        pub transport_company: Option<String>,
        pub vehicle_number: Option<String>,
        pub warehouse_location: Option<String>,
        #[serde(default)]
        pub loading_charges: Option<Value>,
        #[serde(default)]
        pub unloading_charges: Option<Value>,
        #[serde(default)]
        pub transport_charges: Option<Value>,
        #[serde(default)]
        pub other_charges: Option<Value>,
        pub other_charges_description: Option<String>,
        pub expected_arrival_date: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StockUpdate {
        pub product_type: Option<String>,
        pub status: Option<String>,
        pub purchase_date: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub quantity: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub remaining_quantity: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub purchase_rate: Option<Value>,
        pub supplier_name: Option<String>,
        pub supplier_invoice_no: Option<String>,
        pub transport_company: Option<String>,
        pub vehicle_number: Option<String>,
        pub warehouse_location: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub loading_charges: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub unloading_charges: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub transport_charges: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        pub other_charges: Option<Value>,
        pub other_charges_description: Option<String>,
        pub expected_arrival_date: Option<String>,
        pub actual_arrival_date: Option<String>,
        pub unloading_date: Option<String>,
        pub quality_checked: Option<bool>,
        pub quality_remarks: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pub damaged_quantity: Option<Value>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockStatusSet {
        pub status: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ManualPaidSet {
        #[serde(default)]
        pub amount: Option<Value>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ManualPaidView {
        pub manual_paid_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StockListQuery {
        pub status: Option<String>,
        pub product_type: Option<String>,
        pub supplier_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockView {
        pub id: Uuid,
        pub product_type: String,
        pub status: String,
        pub purchase_date: String,
        pub quantity: f64,
        pub remaining_quantity: f64,
        pub purchase_rate_minor: i64,
        pub supplier_name: Option<String>,
        pub supplier_invoice_no: Option<String>,
        pub transport_company: Option<String>,
        pub vehicle_number: Option<String>,
        pub warehouse_location: Option<String>,
        pub loading_charges_minor: i64,
        pub unloading_charges_minor: i64,
        pub transport_charges_minor: i64,
        pub other_charges_minor: i64,
        pub other_charges_description: Option<String>,
        pub expected_arrival_date: Option<String>,
        pub actual_arrival_date: Option<String>,
        pub unloading_date: Option<String>,
        pub quality_checked: bool,
        pub quality_remarks: Option<String>,
        pub damaged_quantity: f64,
        pub notes: Option<String>,
        pub supplier_entry_id: Option<Uuid>,
        pub total_cost_minor: i64,
        pub created_at: String,
        pub updated_at: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockListResponse {
        pub entries: Vec<StockView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusTotalsView {
        pub quantity: f64,
        pub value_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductSummaryView {
        pub total_purchased: f64,
        pub remaining: f64,
        pub sold: f64,
        pub purchase_value_minor: i64,
        pub remaining_value_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockSummaryView {
        pub booked: StatusTotalsView,
        pub on_way: StatusTotalsView,
        pub unloaded: StatusTotalsView,
        pub available: StatusTotalsView,
        pub total: StatusTotalsView,
        pub manual_paid_minor: i64,
        pub by_product: BTreeMap<String, ProductSummaryView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_null_apart_from_absent() {
        let patch: entry::EntryUpdate =
            serde_json::from_str(r#"{"debit": null, "note": "x"}"#).unwrap();
        assert_eq!(patch.debit, Some(Value::Null));
        assert_eq!(patch.credit, None);
        assert_eq!(patch.note.as_deref(), Some("x"));
    }

    #[test]
    fn create_accepts_strings_for_numbers() {
        let new: entry::EntryNew =
            serde_json::from_str(r#"{"account": "ABC", "credit": "1,000", "debit": 4}"#).unwrap();
        assert_eq!(new.credit, Some(Value::String("1,000".to_string())));
        assert_eq!(new.debit, Some(Value::from(4)));
        assert_eq!(new.amount, None);
    }

    #[test]
    fn closing_balance_is_ignored_on_create() {
        let new: entry::EntryNew =
            serde_json::from_str(r#"{"account": "ABC", "closing_balance": 99}"#).unwrap();
        assert_eq!(new.account.as_deref(), Some("ABC"));
    }
}
