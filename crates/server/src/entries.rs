//! Ledger entry API endpoints

use api_types::entry::{
    EntryExpense, EntryListQuery, EntryListResponse, EntryNew, EntryUpdate, EntryView, FeedQuery,
    FeedResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    EngineError, EntryDetails, EntryListFilter, EntryOrder, EntryPatch, LedgerBook, LedgerEntry,
    NewEntryCmd, PaymentDetails, coerce,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, wire};

const DEFAULT_FEED_LIMIT: u64 = 50;

/// Fetches an entry and checks it lives in the book named by the path.
async fn entry_in_book(
    state: &ServerState,
    book: LedgerBook,
    id: Uuid,
) -> Result<LedgerEntry, ServerError> {
    let entry = state.engine.entry(id).await?;
    if entry.account.book != book {
        return Err(EngineError::KeyNotFound("entry not exists".to_string()).into());
    }
    Ok(entry)
}

fn new_entry_cmd(book: LedgerBook, payload: EntryNew) -> Result<NewEntryCmd, ServerError> {
    let details = EntryDetails {
        description: payload.description,
        note: payload.note,
        product_type: payload.product_type,
        quantity: coerce::coerce_number(payload.quantity.as_ref()),
        rate: wire::money(payload.rate.as_ref()),
        loading: wire::money(payload.loading.as_ref()),
        mdays: coerce::coerce_integer(payload.mdays.as_ref()),
        due_date: wire::date(payload.due_date.as_deref())?,
        lifting_date: wire::date(payload.lifting_date.as_deref())?,
        payment: PaymentDetails {
            method: wire::payment_method(payload.payment_method.as_deref())?,
            bank_name: payload.bank_name,
            cheque_no: payload.cheque_no,
            cheque_date: wire::date(payload.cheque_date.as_deref())?,
            transaction_reference: payload.transaction_reference,
        },
        invoice_number: payload.invoice_number,
        invoice_date: wire::date(payload.invoice_date.as_deref())?,
        other_expense_name: payload.other_expense_name,
        other_expense_amount: wire::money(payload.other_expense_amount.as_ref()),
        stock_entry_id: None,
    };

    let mut cmd = NewEntryCmd::new(book)
        .debit(wire::money(payload.debit.as_ref()))
        .credit(wire::money(payload.credit.as_ref()))
        .details(details);
    if let Some(account) = payload.account {
        cmd = cmd.account(account);
    }
    if let Some(date) = wire::date(payload.date.as_deref())? {
        cmd = cmd.date(date);
    }
    if let Some(kind) = wire::kind(payload.kind.as_deref())? {
        cmd = cmd.kind(kind);
    }
    // A null amount counts as missing.
    if let Some(amount) = payload.amount.as_ref().filter(|v| !v.is_null()) {
        cmd = cmd.amount(wire::money(Some(amount)));
    }
    Ok(cmd)
}

fn entry_patch(payload: EntryUpdate) -> Result<EntryPatch, ServerError> {
    let date = match wire::date_patch(payload.date.as_deref())? {
        Some(None) => return Err(EngineError::MissingField("date".to_string()).into()),
        Some(date) => date,
        None => None,
    };
    Ok(EntryPatch {
        account: payload.account,
        date,
        kind: wire::kind(payload.kind.as_deref())?,
        debit: wire::money_patch(payload.debit.as_ref()),
        credit: wire::money_patch(payload.credit.as_ref()),
        amount: wire::money_patch(payload.amount.as_ref()),
        description: payload.description,
        note: payload.note,
        product_type: payload.product_type,
        quantity: wire::number_patch(payload.quantity.as_ref()),
        rate: wire::money_patch(payload.rate.as_ref()),
        loading: wire::money_patch(payload.loading.as_ref()),
        mdays: payload
            .mdays
            .as_ref()
            .map(|v| coerce::coerce_integer(Some(v))),
        due_date: wire::date_patch(payload.due_date.as_deref())?,
        lifting_date: wire::date_patch(payload.lifting_date.as_deref())?,
        payment_method: wire::payment_method(payload.payment_method.as_deref())?,
        bank_name: payload.bank_name,
        cheque_no: payload.cheque_no,
        cheque_date: wire::date_patch(payload.cheque_date.as_deref())?,
        transaction_reference: payload.transaction_reference,
        invoice_number: payload.invoice_number,
        invoice_date: wire::date_patch(payload.invoice_date.as_deref())?,
        other_expense_name: payload.other_expense_name,
        other_expense_amount: wire::money_patch(payload.other_expense_amount.as_ref()),
    })
}

pub async fn list(
    State(state): State<ServerState>,
    Path(book): Path<String>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let book = wire::book(&book)?;
    let filter = EntryListFilter {
        account: query.account.filter(|a| !a.trim().is_empty()),
        from: wire::date(query.from.as_deref())?,
        to: wire::date(query.to.as_deref())?,
        kind: wire::kind(query.kind.as_deref())?,
        order: query
            .order
            .as_deref()
            .map(EntryOrder::try_from)
            .transpose()?
            .unwrap_or_default(),
    };

    let entries = state.engine.list_entries(book, &filter).await?;
    Ok(Json(EntryListResponse {
        entries: entries.iter().map(wire::entry_view).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Path(book): Path<String>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let cmd = new_entry_cmd(wire::book(&book)?, payload)?;
    let entry = state.engine.create_entry(cmd).await?;
    Ok((StatusCode::CREATED, Json(wire::entry_view(&entry))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path((book, id)): Path<(String, Uuid)>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = entry_in_book(&state, wire::book(&book)?, id).await?;
    Ok(Json(wire::entry_view(&entry)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((book, id)): Path<(String, Uuid)>,
    Json(payload): Json<EntryUpdate>,
) -> Result<Json<EntryView>, ServerError> {
    entry_in_book(&state, wire::book(&book)?, id).await?;
    let entry = state.engine.update_entry(id, entry_patch(payload)?).await?;
    Ok(Json(wire::entry_view(&entry)))
}

pub async fn set_expense(
    State(state): State<ServerState>,
    Path((book, id)): Path<(String, Uuid)>,
    Json(payload): Json<EntryExpense>,
) -> Result<Json<EntryView>, ServerError> {
    entry_in_book(&state, wire::book(&book)?, id).await?;
    let entry = state
        .engine
        .set_entry_expense(
            id,
            payload.other_expense_name,
            wire::money(payload.other_expense_amount.as_ref()),
        )
        .await?;
    Ok(Json(wire::entry_view(&entry)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((book, id)): Path<(String, Uuid)>,
) -> Result<Json<EntryView>, ServerError> {
    entry_in_book(&state, wire::book(&book)?, id).await?;
    let entry = state.engine.delete_entry(id).await?;
    Ok(Json(wire::entry_view(&entry)))
}

pub async fn feed(
    State(state): State<ServerState>,
    Path(book): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ServerError> {
    let page = state
        .engine
        .feed_page(
            wire::book(&book)?,
            query.limit.unwrap_or(DEFAULT_FEED_LIMIT),
            query.cursor.as_deref(),
        )
        .await?;
    Ok(Json(FeedResponse {
        entries: page.entries.iter().map(wire::entry_view).collect(),
        next_cursor: page.next_cursor,
    }))
}
