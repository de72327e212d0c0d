use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, EntryDetails, EntryKind, LedgerBook, Money, NewEntryCmd, NewStockCmd,
    ResultEngine, StockCharges, StockEntry, StockPatch, StockStatus, entries,
    stock::{self, settings},
};

use super::{
    Engine, apply_optional_date_patch, apply_optional_text_patch, entries::prepare_entry,
    normalize_optional_text, with_tx,
};

/// Filters for listing stock lots. Every field narrows by equality.
#[derive(Clone, Debug, Default)]
pub struct StockListFilter {
    pub status: Option<StockStatus>,
    pub product_type: Option<String>,
    pub supplier_name: Option<String>,
}

/// Remaining quantity and value of the lots in one status.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusTotals {
    pub quantity: f64,
    pub value: Money,
}

impl StatusTotals {
    fn add(&mut self, quantity: f64, value: Money) {
        self.quantity += quantity;
        self.value += value;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProductSummary {
    pub total_purchased: f64,
    pub remaining: f64,
    pub sold: f64,
    pub purchase_value: Money,
    pub remaining_value: Money,
}

/// Stock position across the register.
///
/// Sold lots count towards the per-product figures only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StockSummary {
    pub booked: StatusTotals,
    pub on_way: StatusTotals,
    pub unloaded: StatusTotals,
    pub available: StatusTotals,
    pub total: StatusTotals,
    pub manual_paid: Money,
    pub by_product: BTreeMap<String, ProductSummary>,
}

impl StockSummary {
    fn from_lots(lots: &[StockEntry], manual_paid: Money) -> Self {
        let mut summary = StockSummary {
            manual_paid,
            ..StockSummary::default()
        };
        for lot in lots {
            let value = lot.remaining_value();
            let bucket = match lot.status {
                StockStatus::Booked => Some(&mut summary.booked),
                StockStatus::OnWay => Some(&mut summary.on_way),
                StockStatus::Unloaded => Some(&mut summary.unloaded),
                StockStatus::Available => Some(&mut summary.available),
                StockStatus::Sold => None,
            };
            if let Some(bucket) = bucket {
                bucket.add(lot.remaining_quantity, value);
                summary.total.add(lot.remaining_quantity, value);
            }

            let product = summary
                .by_product
                .entry(lot.product_type.clone())
                .or_default();
            product.total_purchased += lot.quantity;
            product.remaining += lot.remaining_quantity;
            product.sold += lot.sold_quantity();
            product.purchase_value += lot.total_cost();
            product.remaining_value += value;
        }
        summary
    }
}

fn validate_quantity(quantity: f64, field: &str) -> ResultEngine<()> {
    if quantity == 0.0 || !quantity.is_finite() {
        return Err(EngineError::MissingField(field.to_string()));
    }
    if quantity < 0.0 {
        return Err(EngineError::InvalidValue(format!("{field} must be > 0")));
    }
    Ok(())
}

fn validate_rate(rate: Money) -> ResultEngine<()> {
    if rate.is_zero() {
        return Err(EngineError::MissingField("purchase_rate".to_string()));
    }
    if rate.is_negative() {
        return Err(EngineError::InvalidValue(
            "purchase_rate must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// The supplier purchase booked together with a lot.
fn linked_purchase(lot: &StockEntry, supplier: &str) -> NewEntryCmd {
    NewEntryCmd::new(LedgerBook::Supplier)
        .account(supplier)
        .date(lot.purchase_date)
        .kind(EntryKind::Purchase)
        .amount(lot.total_cost())
        .details(EntryDetails {
            note: Some(format!(
                "Stock purchase: {} - {} units @ {}",
                lot.product_type, lot.quantity, lot.purchase_rate
            )),
            invoice_number: lot.supplier_invoice_no.clone(),
            invoice_date: Some(lot.purchase_date),
            stock_entry_id: Some(lot.id),
            ..EntryDetails::default()
        })
}

impl Engine {
    async fn require_stock(&self, id: Uuid) -> ResultEngine<StockEntry> {
        let model = stock::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("stock entry not exists".to_string()))?;
        StockEntry::try_from(model)
    }

    /// Registers a stock lot.
    ///
    /// With a supplier, a linked supplier `PURCHASE` for the full cost of the
    /// lot is booked in the same transaction and the supplier account is
    /// recomputed.
    pub async fn create_stock(&self, cmd: NewStockCmd) -> ResultEngine<StockEntry> {
        let product_type = normalize_optional_text(cmd.product_type.as_deref())
            .ok_or_else(|| EngineError::MissingField("product_type".to_string()))?;
        let purchase_date = cmd
            .purchase_date
            .ok_or_else(|| EngineError::MissingField("purchase_date".to_string()))?;
        validate_quantity(cmd.quantity, "quantity")?;
        validate_rate(cmd.purchase_rate)?;

        let now = Utc::now();
        let mut lot = StockEntry {
            id: Uuid::new_v4(),
            product_type,
            status: cmd.status.unwrap_or(StockStatus::Booked),
            purchase_date,
            quantity: cmd.quantity,
            remaining_quantity: cmd.quantity,
            purchase_rate: cmd.purchase_rate,
            supplier_name: normalize_optional_text(cmd.supplier_name.as_deref()),
            supplier_invoice_no: normalize_optional_text(cmd.supplier_invoice_no.as_deref()),
            transport_company: normalize_optional_text(cmd.transport_company.as_deref()),
            vehicle_number: normalize_optional_text(cmd.vehicle_number.as_deref()),
            warehouse_location: normalize_optional_text(cmd.warehouse_location.as_deref()),
            charges: cmd.charges,
            other_charges_description: normalize_optional_text(
                cmd.other_charges_description.as_deref(),
            ),
            expected_arrival_date: cmd.expected_arrival_date,
            actual_arrival_date: None,
            unloading_date: None,
            quality_checked: false,
            quality_remarks: None,
            damaged_quantity: 0.0,
            notes: normalize_optional_text(cmd.notes.as_deref()),
            supplier_entry_id: None,
            created_at: now,
            updated_at: now,
        };
        lot.check_limits()?;

        let Some(supplier) = lot.supplier_name.clone() else {
            with_tx!(self, |db_tx| {
                stock::ActiveModel::from(&lot).insert(&db_tx).await?;
                Ok::<_, EngineError>(())
            })?;
            return Ok(lot);
        };

        let purchase = prepare_entry(linked_purchase(&lot, &supplier))?;
        let key = purchase.account.clone();
        lot.supplier_entry_id = Some(purchase.id);

        let _guard = self.locks.lock([&key]).await;
        {
            let _seq = self.sequence.lock().await;
            with_tx!(self, |db_tx| {
                stock::ActiveModel::from(&lot).insert(&db_tx).await?;
                self.insert_entry(&db_tx, purchase).await?;
                self.check_replay(&db_tx, &key).await?;
                Ok::<_, EngineError>(())
            })?;
        }
        tracing::debug!(stock = %lot.id, supplier = %key, "booked stock purchase");

        self.recompute_locked(&key).await?;
        Ok(lot)
    }

    /// Lots matching the filter, newest first.
    pub async fn stock_entries(&self, filter: &StockListFilter) -> ResultEngine<Vec<StockEntry>> {
        let mut query = stock::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(stock::Column::Status.eq(status.as_str()));
        }
        if let Some(product_type) = filter.product_type.as_deref() {
            query = query.filter(stock::Column::ProductType.eq(product_type.trim()));
        }
        if let Some(supplier_name) = filter.supplier_name.as_deref() {
            query = query.filter(stock::Column::SupplierName.eq(supplier_name.trim()));
        }
        query
            .order_by_desc(stock::Column::CreatedAt)
            .order_by_desc(stock::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(StockEntry::try_from)
            .collect()
    }

    pub async fn stock_entry(&self, id: Uuid) -> ResultEngine<StockEntry> {
        self.require_stock(id).await
    }

    /// Partial update of a lot. The linked supplier purchase keeps its
    /// amount.
    pub async fn update_stock(&self, id: Uuid, patch: StockPatch) -> ResultEngine<StockEntry> {
        let mut lot = self.require_stock(id).await?;

        if let Some(product_type) = patch.product_type.as_deref() {
            lot.product_type = normalize_optional_text(Some(product_type))
                .ok_or_else(|| EngineError::MissingField("product_type".to_string()))?;
        }
        if let Some(status) = patch.status {
            lot.status = status;
        }
        if let Some(date) = patch.purchase_date {
            lot.purchase_date = date;
        }
        if let Some(quantity) = patch.quantity {
            validate_quantity(quantity, "quantity")?;
            lot.quantity = quantity;
        }
        if let Some(remaining) = patch.remaining_quantity {
            if remaining < 0.0 || !remaining.is_finite() {
                return Err(EngineError::InvalidValue(
                    "remaining_quantity must be >= 0".to_string(),
                ));
            }
            lot.remaining_quantity = remaining;
        }
        if let Some(rate) = patch.purchase_rate {
            validate_rate(rate)?;
            lot.purchase_rate = rate;
        }

        lot.supplier_name =
            apply_optional_text_patch(lot.supplier_name.take(), patch.supplier_name.as_deref());
        lot.supplier_invoice_no = apply_optional_text_patch(
            lot.supplier_invoice_no.take(),
            patch.supplier_invoice_no.as_deref(),
        );
        lot.transport_company = apply_optional_text_patch(
            lot.transport_company.take(),
            patch.transport_company.as_deref(),
        );
        lot.vehicle_number =
            apply_optional_text_patch(lot.vehicle_number.take(), patch.vehicle_number.as_deref());
        lot.warehouse_location = apply_optional_text_patch(
            lot.warehouse_location.take(),
            patch.warehouse_location.as_deref(),
        );
        let StockCharges {
            loading,
            unloading,
            transport,
            other,
        } = lot.charges;
        lot.charges = StockCharges {
            loading: patch.loading_charges.unwrap_or(loading),
            unloading: patch.unloading_charges.unwrap_or(unloading),
            transport: patch.transport_charges.unwrap_or(transport),
            other: patch.other_charges.unwrap_or(other),
        };
        lot.other_charges_description = apply_optional_text_patch(
            lot.other_charges_description.take(),
            patch.other_charges_description.as_deref(),
        );
        lot.expected_arrival_date =
            apply_optional_date_patch(lot.expected_arrival_date, patch.expected_arrival_date);
        lot.actual_arrival_date =
            apply_optional_date_patch(lot.actual_arrival_date, patch.actual_arrival_date);
        lot.unloading_date = apply_optional_date_patch(lot.unloading_date, patch.unloading_date);
        if let Some(checked) = patch.quality_checked {
            lot.quality_checked = checked;
        }
        lot.quality_remarks =
            apply_optional_text_patch(lot.quality_remarks.take(), patch.quality_remarks.as_deref());
        if let Some(damaged) = patch.damaged_quantity {
            lot.damaged_quantity = damaged;
        }
        lot.notes = apply_optional_text_patch(lot.notes.take(), patch.notes.as_deref());
        lot.updated_at = Utc::now();
        lot.check_limits()?;

        with_tx!(self, |db_tx| {
            stock::ActiveModel::from(&lot).update(&db_tx).await?;
            Ok::<_, EngineError>(())
        })?;
        Ok(lot)
    }

    pub async fn set_stock_status(&self, id: Uuid, status: StockStatus) -> ResultEngine<StockEntry> {
        let patch = StockPatch {
            status: Some(status),
            ..StockPatch::default()
        };
        self.update_stock(id, patch).await
    }

    /// Deletes a lot that has not been sold from, together with its linked
    /// supplier purchase, and recomputes the supplier account.
    pub async fn delete_stock(&self, id: Uuid) -> ResultEngine<StockEntry> {
        let lot = self.require_stock(id).await?;
        if lot.remaining_quantity < lot.quantity {
            return Err(EngineError::Conflict(format!(
                "stock entry {id} has sales; adjust them before deleting"
            )));
        }

        let Some(purchase_id) = lot.supplier_entry_id else {
            with_tx!(self, |db_tx| {
                stock::Entity::delete_by_id(id.to_string())
                    .exec(&db_tx)
                    .await?;
                Ok::<_, EngineError>(())
            })?;
            return Ok(lot);
        };

        let (purchase, _guard) = match self.lock_entry(purchase_id, None).await {
            Ok((purchase, guard)) => (Some(purchase), Some(guard)),
            Err(EngineError::KeyNotFound(_)) => (None, None),
            Err(err) => return Err(err),
        };

        with_tx!(self, |db_tx| {
            stock::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            entries::Entity::delete_by_id(purchase_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;
        tracing::debug!(stock = %id, entry = %purchase_id, "deleted stock entry");

        if let Some(purchase) = purchase {
            self.recompute_locked(&purchase.account).await?;
        }
        Ok(lot)
    }

    /// Register-wide stock position.
    pub async fn stock_summary(&self) -> ResultEngine<StockSummary> {
        let lots = self.stock_entries(&StockListFilter::default()).await?;
        let manual_paid = settings::Entity::find_by_id(settings::SETTINGS_ROW)
            .one(&self.database)
            .await?
            .map(|row| Money::new(row.manual_paid_minor))
            .unwrap_or_default();
        Ok(StockSummary::from_lots(&lots, manual_paid))
    }

    /// Stores the manually tracked amount paid for stock.
    pub async fn set_manual_paid(&self, amount: Money) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            let row = settings::ActiveModel {
                id: ActiveValue::Set(settings::SETTINGS_ROW),
                manual_paid_minor: ActiveValue::Set(amount.minor()),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            let exists = settings::Entity::find_by_id(settings::SETTINGS_ROW)
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                row.update(&db_tx).await?;
            } else {
                row.insert(&db_tx).await?;
            }
            Ok(amount)
        })
    }
}
