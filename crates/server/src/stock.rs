//! Stock register endpoints

use api_types::stock::{
    ManualPaidSet, ManualPaidView, StockListQuery, StockListResponse, StockNew, StockStatusSet,
    StockSummaryView, StockUpdate, StockView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EngineError, NewStockCmd, StockCharges, StockListFilter, StockPatch, coerce};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, wire};

fn new_stock_cmd(payload: StockNew) -> Result<NewStockCmd, ServerError> {
    Ok(NewStockCmd {
        product_type: payload.product_type,
        status: wire::status(payload.status.as_deref())?,
        purchase_date: wire::date(payload.purchase_date.as_deref())?,
        quantity: coerce::coerce_number(payload.quantity.as_ref()),
        purchase_rate: wire::money(payload.purchase_rate.as_ref()),
        supplier_name: payload.supplier_name,
        supplier_invoice_no: payload.supplier_invoice_no,
        transport_company: payload.transport_company,
        vehicle_number: payload.vehicle_number,
        warehouse_location: payload.warehouse_location,
        charges: StockCharges {
            loading: wire::money(payload.loading_charges.as_ref()),
            unloading: wire::money(payload.unloading_charges.as_ref()),
            transport: wire::money(payload.transport_charges.as_ref()),
            other: wire::money(payload.other_charges.as_ref()),
        },
        other_charges_description: payload.other_charges_description,
        expected_arrival_date: wire::date(payload.expected_arrival_date.as_deref())?,
        notes: payload.notes,
    })
}

fn stock_patch(payload: StockUpdate) -> Result<StockPatch, ServerError> {
    let purchase_date = match wire::date_patch(payload.purchase_date.as_deref())? {
        Some(None) => {
            return Err(EngineError::MissingField("purchase_date".to_string()).into());
        }
        Some(date) => date,
        None => None,
    };
    Ok(StockPatch {
        product_type: payload.product_type,
        status: wire::status(payload.status.as_deref())?,
        purchase_date,
        quantity: wire::number_patch(payload.quantity.as_ref()),
        remaining_quantity: wire::number_patch(payload.remaining_quantity.as_ref()),
        purchase_rate: wire::money_patch(payload.purchase_rate.as_ref()),
        supplier_name: payload.supplier_name,
        supplier_invoice_no: payload.supplier_invoice_no,
        transport_company: payload.transport_company,
        vehicle_number: payload.vehicle_number,
        warehouse_location: payload.warehouse_location,
        loading_charges: wire::money_patch(payload.loading_charges.as_ref()),
        unloading_charges: wire::money_patch(payload.unloading_charges.as_ref()),
        transport_charges: wire::money_patch(payload.transport_charges.as_ref()),
        other_charges: wire::money_patch(payload.other_charges.as_ref()),
        other_charges_description: payload.other_charges_description,
        expected_arrival_date: wire::date_patch(payload.expected_arrival_date.as_deref())?,
        actual_arrival_date: wire::date_patch(payload.actual_arrival_date.as_deref())?,
        unloading_date: wire::date_patch(payload.unloading_date.as_deref())?,
        quality_checked: payload.quality_checked,
        quality_remarks: payload.quality_remarks,
        damaged_quantity: wire::number_patch(payload.damaged_quantity.as_ref()),
        notes: payload.notes,
    })
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<StockListQuery>,
) -> Result<Json<StockListResponse>, ServerError> {
    let filter = StockListFilter {
        status: wire::status(query.status.as_deref())?,
        product_type: query.product_type.filter(|p| !p.trim().is_empty()),
        supplier_name: query.supplier_name.filter(|s| !s.trim().is_empty()),
    };
    let lots = state.engine.stock_entries(&filter).await?;
    Ok(Json(StockListResponse {
        entries: lots.iter().map(wire::stock_view).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockNew>,
) -> Result<(StatusCode, Json<StockView>), ServerError> {
    let lot = state.engine.create_stock(new_stock_cmd(payload)?).await?;
    Ok((StatusCode::CREATED, Json(wire::stock_view(&lot))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockUpdate>,
) -> Result<Json<StockView>, ServerError> {
    let lot = state.engine.update_stock(id, stock_patch(payload)?).await?;
    Ok(Json(wire::stock_view(&lot)))
}

pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockStatusSet>,
) -> Result<Json<StockView>, ServerError> {
    let status = wire::status(Some(&payload.status))?
        .ok_or_else(|| EngineError::MissingField("status".to_string()))?;
    let lot = state.engine.set_stock_status(id, status).await?;
    Ok(Json(wire::stock_view(&lot)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockView>, ServerError> {
    let lot = state.engine.delete_stock(id).await?;
    Ok(Json(wire::stock_view(&lot)))
}

pub async fn summary(
    State(state): State<ServerState>,
) -> Result<Json<StockSummaryView>, ServerError> {
    let summary = state.engine.stock_summary().await?;
    Ok(Json(wire::stock_summary_view(&summary)))
}

pub async fn set_manual_paid(
    State(state): State<ServerState>,
    Json(payload): Json<ManualPaidSet>,
) -> Result<Json<ManualPaidView>, ServerError> {
    let paid = state
        .engine
        .set_manual_paid(wire::money(payload.amount.as_ref()))
        .await?;
    Ok(Json(ManualPaidView {
        manual_paid_minor: paid.minor(),
    }))
}
