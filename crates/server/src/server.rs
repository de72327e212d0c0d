use axum::{
    Router,
    routing::{get, patch, post, put},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{accounts, clients, entries, stock};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn health() -> &'static str {
    "ledgerbook is running"
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(
            "/api/books/{book}/entries",
            get(entries::list).post(entries::create),
        )
        .route(
            "/api/books/{book}/entries/{id}",
            get(entries::get)
                .put(entries::update)
                .delete(entries::delete),
        )
        .route(
            "/api/books/{book}/entries/{id}/expense",
            patch(entries::set_expense),
        )
        .route("/api/books/{book}/feed", get(entries::feed))
        .route("/api/books/{book}/accounts", get(accounts::list))
        .route("/api/books/{book}/accounts/{account}", get(accounts::statement))
        .route(
            "/api/books/{book}/accounts/{account}/recompute",
            post(accounts::recompute),
        )
        .route("/api/books/{book}/opening", post(accounts::set_opening))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/api/stock", get(stock::list).post(stock::create))
        .route("/api/stock/summary", get(stock::summary))
        .route("/api/stock/manual-paid", post(stock::set_manual_paid))
        .route("/api/stock/{id}", put(stock::update).delete(stock::delete))
        .route("/api/stock/{id}/status", post(stock::set_status))
        .with_state(state)
}

/// Binds `addr` and serves until the listener fails.
pub async fn run(engine: Engine, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
