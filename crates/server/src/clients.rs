//! Clients directory endpoints

use api_types::client::{ClientListResponse, ClientNew, ClientUpdate, ClientView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ClientPatch, EngineError, NewClientCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, wire};

pub async fn list(State(state): State<ServerState>) -> Result<Json<ClientListResponse>, ServerError> {
    let clients = state.engine.clients().await?;
    Ok(Json(ClientListResponse {
        clients: clients.iter().map(wire::client_view).collect(),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientNew>,
) -> Result<(StatusCode, Json<ClientView>), ServerError> {
    let name = payload
        .name
        .ok_or_else(|| EngineError::MissingField("name".to_string()))?;
    let cmd = NewClientCmd {
        phone: payload.phone,
        address: payload.address,
        opening_balance: wire::money(payload.opening_balance.as_ref()),
        remarks: payload.remarks,
        ..NewClientCmd::new(name)
    };

    let client = state.engine.create_client(cmd).await?;
    Ok((StatusCode::CREATED, Json(wire::client_view(&client))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientView>, ServerError> {
    let client = state.engine.client(id).await?;
    Ok(Json(wire::client_view(&client)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientUpdate>,
) -> Result<Json<ClientView>, ServerError> {
    let patch = ClientPatch {
        name: payload.name,
        phone: payload.phone,
        address: payload.address,
        opening_balance: wire::money_patch(payload.opening_balance.as_ref()),
        remarks: payload.remarks,
    };
    let client = state.engine.update_client(id, patch).await?;
    Ok(Json(wire::client_view(&client)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
