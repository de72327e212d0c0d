//! Stock register entries and the stock settings row.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Booked,
    OnWay,
    Unloaded,
    Available,
    Sold,
}

impl StockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "BOOKED",
            Self::OnWay => "ON_WAY",
            Self::Unloaded => "UNLOADED",
            Self::Available => "AVAILABLE",
            Self::Sold => "SOLD",
        }
    }
}

impl TryFrom<&str> for StockStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BOOKED" => Ok(Self::Booked),
            "ON_WAY" => Ok(Self::OnWay),
            "UNLOADED" => Ok(Self::Unloaded),
            "AVAILABLE" => Ok(Self::Available),
            "SOLD" => Ok(Self::Sold),
            other => Err(EngineError::InvalidValue(format!(
                "invalid stock status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StockCharges {
    pub loading: Money,
    pub unloading: Money,
    pub transport: Money,
    pub other: Money,
}

impl StockCharges {
    pub fn total(&self) -> Money {
        self.loading + self.unloading + self.transport + self.other
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StockEntry {
    pub id: Uuid,
    pub product_type: String,
    pub status: StockStatus,
    pub purchase_date: NaiveDate,
    pub quantity: f64,
    pub remaining_quantity: f64,
    pub purchase_rate: Money,
    pub supplier_name: Option<String>,
    pub supplier_invoice_no: Option<String>,
    pub transport_company: Option<String>,
    pub vehicle_number: Option<String>,
    pub warehouse_location: Option<String>,
    pub charges: StockCharges,
    pub other_charges_description: Option<String>,
    pub expected_arrival_date: Option<NaiveDate>,
    pub actual_arrival_date: Option<NaiveDate>,
    pub unloading_date: Option<NaiveDate>,
    pub quality_checked: bool,
    pub quality_remarks: Option<String>,
    pub damaged_quantity: f64,
    pub notes: Option<String>,
    /// Supplier `PURCHASE` entry created together with this lot.
    pub supplier_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    /// Purchase cost of the whole lot: `quantity × rate` plus every charge.
    pub fn total_cost(&self) -> Money {
        self.purchase_rate.times_quantity(self.quantity) + self.charges.total()
    }

    /// Value of what is left, at the cost-inclusive rate.
    pub fn remaining_value(&self) -> Money {
        if self.quantity > 0.0 {
            let per_unit = self.total_cost().minor() as f64 / self.quantity;
            Money::new((per_unit * self.remaining_quantity).round() as i64)
        } else {
            self.purchase_rate.times_quantity(self.remaining_quantity)
        }
    }

    pub fn sold_quantity(&self) -> f64 {
        self.quantity - self.remaining_quantity
    }

    /// Rejects a rate, a charge or a total cost larger than [`Money::MAX`].
    pub fn check_limits(&self) -> ResultEngine<()> {
        let out_of_range = |field: &str| EngineError::InvalidValue(format!("{field} out of range"));
        let fields = [
            ("purchase_rate", self.purchase_rate),
            ("loading_charges", self.charges.loading),
            ("unloading_charges", self.charges.unloading),
            ("transport_charges", self.charges.transport),
            ("other_charges", self.charges.other),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, value)| !value.is_within_limit()) {
            return Err(out_of_range(field));
        }
        let goods = self.purchase_rate.minor() as f64 * self.quantity;
        if !goods.is_finite() || goods.abs() > Money::MAX.minor() as f64 {
            return Err(out_of_range("total_cost"));
        }
        if !self.total_cost().is_within_limit() {
            return Err(out_of_range("total_cost"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_type: String,
    pub status: String,
    pub purchase_date: Date,
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
    pub expected_arrival_date: Option<Date>,
    pub actual_arrival_date: Option<Date>,
    pub unloading_date: Option<Date>,
    pub quality_checked: bool,
    pub quality_remarks: Option<String>,
    pub damaged_quantity: f64,
    pub notes: Option<String>,
    pub supplier_entry_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&StockEntry> for ActiveModel {
    fn from(entry: &StockEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            product_type: ActiveValue::Set(entry.product_type.clone()),
            status: ActiveValue::Set(entry.status.as_str().to_string()),
            purchase_date: ActiveValue::Set(entry.purchase_date),
            quantity: ActiveValue::Set(entry.quantity),
            remaining_quantity: ActiveValue::Set(entry.remaining_quantity),
            purchase_rate_minor: ActiveValue::Set(entry.purchase_rate.minor()),
            supplier_name: ActiveValue::Set(entry.supplier_name.clone()),
            supplier_invoice_no: ActiveValue::Set(entry.supplier_invoice_no.clone()),
            transport_company: ActiveValue::Set(entry.transport_company.clone()),
            vehicle_number: ActiveValue::Set(entry.vehicle_number.clone()),
            warehouse_location: ActiveValue::Set(entry.warehouse_location.clone()),
            loading_charges_minor: ActiveValue::Set(entry.charges.loading.minor()),
            unloading_charges_minor: ActiveValue::Set(entry.charges.unloading.minor()),
            transport_charges_minor: ActiveValue::Set(entry.charges.transport.minor()),
            other_charges_minor: ActiveValue::Set(entry.charges.other.minor()),
            other_charges_description: ActiveValue::Set(entry.other_charges_description.clone()),
            expected_arrival_date: ActiveValue::Set(entry.expected_arrival_date),
            actual_arrival_date: ActiveValue::Set(entry.actual_arrival_date),
            unloading_date: ActiveValue::Set(entry.unloading_date),
            quality_checked: ActiveValue::Set(entry.quality_checked),
            quality_remarks: ActiveValue::Set(entry.quality_remarks.clone()),
            damaged_quantity: ActiveValue::Set(entry.damaged_quantity),
            notes: ActiveValue::Set(entry.notes.clone()),
            supplier_entry_id: ActiveValue::Set(entry.supplier_entry_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(entry.created_at),
            updated_at: ActiveValue::Set(entry.updated_at),
        }
    }
}

impl TryFrom<Model> for StockEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "stock entry")?,
            product_type: model.product_type,
            status: StockStatus::try_from(model.status.as_str())?,
            purchase_date: model.purchase_date,
            quantity: model.quantity,
            remaining_quantity: model.remaining_quantity,
            purchase_rate: Money::new(model.purchase_rate_minor),
            supplier_name: model.supplier_name,
            supplier_invoice_no: model.supplier_invoice_no,
            transport_company: model.transport_company,
            vehicle_number: model.vehicle_number,
            warehouse_location: model.warehouse_location,
            charges: StockCharges {
                loading: Money::new(model.loading_charges_minor),
                unloading: Money::new(model.unloading_charges_minor),
                transport: Money::new(model.transport_charges_minor),
                other: Money::new(model.other_charges_minor),
            },
            other_charges_description: model.other_charges_description,
            expected_arrival_date: model.expected_arrival_date,
            actual_arrival_date: model.actual_arrival_date,
            unloading_date: model.unloading_date,
            quality_checked: model.quality_checked,
            quality_remarks: model.quality_remarks,
            damaged_quantity: model.damaged_quantity,
            notes: model.notes,
            supplier_entry_id: model
                .supplier_entry_id
                .as_deref()
                .map(|id| parse_uuid(id, "ledger entry"))
                .transpose()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub mod settings {
    //! Single-row table holding register-wide figures.

    use sea_orm::entity::prelude::*;

    /// Primary key of the only settings row.
    pub const SETTINGS_ROW: i32 = 1;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "stock_settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub manual_paid_minor: i64,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(quantity: f64, remaining: f64, rate: i64, charges: i64) -> StockEntry {
        let now = Utc::now();
        StockEntry {
            id: Uuid::new_v4(),
            product_type: "Cement".to_string(),
            status: StockStatus::Available,
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            quantity,
            remaining_quantity: remaining,
            purchase_rate: Money::new(rate),
            supplier_name: None,
            supplier_invoice_no: None,
            transport_company: None,
            vehicle_number: None,
            warehouse_location: None,
            charges: StockCharges {
                transport: Money::new(charges),
                ..StockCharges::default()
            },
            other_charges_description: None,
            expected_arrival_date: None,
            actual_arrival_date: None,
            unloading_date: None,
            quality_checked: false,
            quality_remarks: None,
            damaged_quantity: 0.0,
            notes: None,
            supplier_entry_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_cost_includes_charges() {
        assert_eq!(lot(10.0, 10.0, 250_00, 100_00).total_cost(), Money::new(2600_00));
    }

    #[test]
    fn limits_cover_rate_charges_and_total() {
        assert!(lot(10.0, 10.0, 250_00, 100_00).check_limits().is_ok());
        assert_eq!(
            lot(1.0, 1.0, Money::MAX.minor() + 1, 0).check_limits(),
            Err(EngineError::InvalidValue("purchase_rate out of range".to_string()))
        );
        assert_eq!(
            lot(1.0, 1.0, 100, i64::MAX).check_limits(),
            Err(EngineError::InvalidValue("transport_charges out of range".to_string()))
        );
        assert_eq!(
            lot(1e12, 1e12, Money::MAX.minor(), 0).check_limits(),
            Err(EngineError::InvalidValue("total_cost out of range".to_string()))
        );
        assert_eq!(
            lot(1.0, 1.0, Money::MAX.minor(), Money::MAX.minor()).check_limits(),
            Err(EngineError::InvalidValue("total_cost out of range".to_string()))
        );
    }

    #[test]
    fn remaining_value_uses_effective_rate() {
        // (10 × 250 + 100) / 10 = 260 per unit, 4 left
        assert_eq!(lot(10.0, 4.0, 250_00, 100_00).remaining_value(), Money::new(1040_00));
        assert_eq!(lot(10.0, 4.0, 250_00, 100_00).sold_quantity(), 6.0);
    }

    #[test]
    fn status_round_trips_wire_names() {
        assert_eq!(StockStatus::try_from("on_way").unwrap(), StockStatus::OnWay);
        assert!(StockStatus::try_from("LOST").is_err());
    }
}
