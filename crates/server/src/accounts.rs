//! Account statements, summaries and maintenance endpoints

use api_types::{
    account::{AccountListResponse, AccountStatementView, OpeningBalanceSet},
    entry::EntryView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, OpeningBalanceCmd};

use crate::{ServerError, server::ServerState, wire};

pub async fn list(
    State(state): State<ServerState>,
    Path(book): Path<String>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let summaries = state.engine.account_summaries(wire::book(&book)?).await?;
    Ok(Json(AccountListResponse {
        accounts: summaries.iter().map(wire::summary_view).collect(),
    }))
}

pub async fn statement(
    State(state): State<ServerState>,
    Path((book, account)): Path<(String, String)>,
) -> Result<Json<AccountStatementView>, ServerError> {
    let statement = state
        .engine
        .account_statement(wire::book(&book)?, &account)
        .await?;
    Ok(Json(wire::statement_view(&statement)))
}

/// Rebuilds every closing balance of an account, e.g. after a partial
/// failure.
pub async fn recompute(
    State(state): State<ServerState>,
    Path((book, account)): Path<(String, String)>,
) -> Result<Json<AccountStatementView>, ServerError> {
    let statement = state.engine.recompute(wire::book(&book)?, &account).await?;
    Ok(Json(wire::statement_view(&statement)))
}

pub async fn set_opening(
    State(state): State<ServerState>,
    Path(book): Path<String>,
    Json(payload): Json<OpeningBalanceSet>,
) -> Result<(StatusCode, Json<EntryView>), ServerError> {
    let book = wire::book(&book)?;
    let account = payload
        .account
        .ok_or_else(|| EngineError::MissingField("account".to_string()))?;

    let mut cmd = OpeningBalanceCmd::new(book, account, wire::money(payload.amount.as_ref()));
    if let Some(note) = payload.note.filter(|n| !n.trim().is_empty()) {
        cmd = cmd.note(note);
    }
    if let Some(date) = wire::date(payload.date.as_deref())? {
        cmd = cmd.date(date);
    }

    let entry = state.engine.set_opening_balance(cmd).await?;
    Ok((StatusCode::CREATED, Json(wire::entry_view(&entry))))
}
