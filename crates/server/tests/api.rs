use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn closing_balances(entries: &Value) -> Vec<i64> {
    entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["closing_balance_minor"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ledgerbook is running".to_string()));
}

#[tokio::test]
async fn client_ledger_flow() {
    let app = app().await;

    let (status, first) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-01", "credit": "1000", "closing_balance": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["closing_balance_minor"], 100000);
    assert_eq!(first["kind"], "SALE");

    call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-05T10:00:00Z", "debit": 400 })),
    )
    .await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-03", "credit": 200, "debit": "n/a" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, statement) = call(&app, Method::GET, "/api/books/client/accounts/ABC", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        closing_balances(&statement["entries"]),
        vec![100000, 120000, 80000]
    );
    assert_eq!(statement["totals"]["closing_balance_minor"], 80000);
    assert_eq!(statement["totals"]["entry_count"], 3);

    let (status, listed) = call(
        &app,
        Method::GET,
        "/api/books/client/entries?account=ABC&from=2024-01-02&to=2024-01-05",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["entries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn update_and_delete_recompute() {
    let app = app().await;
    let (_, entry) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-01", "credit": 100 })),
    )
    .await;
    let (_, second) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-02", "credit": 50, "note": "keep" })),
    )
    .await;
    let id = entry["id"].as_str().unwrap().to_string();
    let second_id = second["id"].as_str().unwrap().to_string();

    // Explicit null coerces to 0; absent fields stay.
    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/books/client/entries/{id}"),
        Some(json!({ "credit": null, "debit": "25" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["credit_minor"], 0);
    assert_eq!(updated["debit_minor"], 2500);
    assert_eq!(updated["closing_balance_minor"], -2500);

    let (_, second) = call(
        &app,
        Method::GET,
        &format!("/api/books/client/entries/{second_id}"),
        None,
    )
    .await;
    assert_eq!(second["closing_balance_minor"], 2500);
    assert_eq!(second["note"], "keep");

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/books/client/entries/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = call(
        &app,
        Method::GET,
        &format!("/api/books/client/entries/{second_id}"),
        None,
    )
    .await;
    assert_eq!(second["closing_balance_minor"], 5000);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/books/client/entries/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    // The entry lives in the client book only.
    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/books/supplier/entries/{second_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expense_patch_touches_only_the_expense_pair() {
    let app = app().await;
    let (_, entry) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-01", "credit": 100 })),
    )
    .await;
    let id = entry["id"].as_str().unwrap();

    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/api/books/client/entries/{id}/expense"),
        Some(json!({ "other_expense_name": "Freight", "other_expense_amount": "12.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["other_expense_name"], "Freight");
    assert_eq!(updated["other_expense_amount_minor"], 1250);
    assert_eq!(updated["credit_minor"], 10000);
}

#[tokio::test]
async fn validation_errors_are_422() {
    let app = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "date": "2024-01-01", "credit": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Missing field: account");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "credit": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/books/supplier/entries",
        Some(json!({ "account": "Acme", "date": "2024-01-01", "amount": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "ABC", "date": "2024-01-01", "kind": "REFUND" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(&app, Method::GET, "/api/books/savings/accounts", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        Method::GET,
        "/api/books/client/feed?cursor=garbage",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/books/client/entries",
        Some(json!({ "account": "Big", "date": "2024-01-01", "credit": "90000000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid value: credit out of range");
    let (status, accounts) = call(&app, Method::GET, "/api/books/client/accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!accounts.to_string().contains("Big"));
}

#[tokio::test]
async fn supplier_book_and_opening_balance() {
    let app = app().await;

    let (status, opening) = call(
        &app,
        Method::POST,
        "/api/books/supplier/opening",
        Some(json!({ "account": "Acme", "amount": 5000, "date": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(opening["kind"], "OPENING");
    assert_eq!(opening["note"], "Opening balance set");

    call(
        &app,
        Method::POST,
        "/api/books/supplier/entries",
        Some(json!({ "account": "Acme", "date": "2024-01-02", "kind": "PURCHASE", "amount": 2000 })),
    )
    .await;
    call(
        &app,
        Method::POST,
        "/api/books/supplier/entries",
        Some(json!({ "account": "Acme", "date": "2024-01-03", "amount": "3000" })),
    )
    .await;

    let (_, statement) = call(&app, Method::GET, "/api/books/supplier/accounts/Acme", None).await;
    assert_eq!(
        closing_balances(&statement["entries"]),
        vec![500000, 700000, 400000]
    );

    call(
        &app,
        Method::POST,
        "/api/books/supplier/opening",
        Some(json!({ "account": "Acme", "amount": 1000, "date": "2024-01-01" })),
    )
    .await;
    let (_, accounts) = call(&app, Method::GET, "/api/books/supplier/accounts", None).await;
    let accounts = accounts["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["account"], "Acme");
    assert_eq!(accounts[0]["totals"]["entry_count"], 3);
    assert_eq!(accounts[0]["totals"]["closing_balance_minor"], 0);

    let (status, recomputed) = call(
        &app,
        Method::POST,
        "/api/books/supplier/accounts/Acme/recompute",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recomputed["totals"]["closing_balance_minor"], 0);
}

#[tokio::test]
async fn feed_paginates() {
    let app = app().await;
    for day in 1..=3 {
        call(
            &app,
            Method::POST,
            "/api/books/company_balance/entries",
            Some(json!({ "account": "Ravi", "date": format!("2024-01-0{day}"), "credit": day })),
        )
        .await;
    }

    let (status, page) = call(&app, Method::GET, "/api/books/company_balance/feed?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["entries"].as_array().unwrap().len(), 2);
    assert_eq!(page["entries"][0]["date"], "2024-01-03");
    let cursor = page["next_cursor"].as_str().unwrap();

    let (_, page) = call(
        &app,
        Method::GET,
        &format!("/api/books/company_balance/feed?limit=2&cursor={cursor}"),
        None,
    )
    .await;
    assert_eq!(page["entries"].as_array().unwrap().len(), 1);
    assert_eq!(page["entries"][0]["date"], "2024-01-01");
    assert!(page["next_cursor"].is_null());
}

#[tokio::test]
async fn clients_crud() {
    let app = app().await;

    let (status, client) = call(
        &app,
        Method::POST,
        "/api/clients",
        Some(json!({ "name": "Ravi", "opening_balance": "150.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(client["opening_balance_minor"], 15050);
    let id = client["id"].as_str().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/clients",
        Some(json!({ "name": "ravi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/clients/{id}"),
        Some(json!({ "phone": "12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "12345");
    assert_eq!(updated["opening_balance_minor"], 15050);

    let (_, list) = call(&app, Method::GET, "/api/clients", None).await;
    assert_eq!(list["clients"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_with_supplier() {
    let app = app().await;

    let (status, lot) = call(
        &app,
        Method::POST,
        "/api/stock",
        Some(json!({
            "product_type": "Cement",
            "purchase_date": "2024-03-01",
            "quantity": "10",
            "purchase_rate": 250,
            "transport_charges": 100,
            "supplier_name": "Acme",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lot["status"], "BOOKED");
    assert_eq!(lot["total_cost_minor"], 260000);
    let id = lot["id"].as_str().unwrap();
    let purchase_id = lot["supplier_entry_id"].as_str().unwrap();

    let (_, statement) = call(&app, Method::GET, "/api/books/supplier/accounts/Acme", None).await;
    assert_eq!(closing_balances(&statement["entries"]), vec![260000]);
    assert_eq!(statement["entries"][0]["kind"], "PURCHASE");

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/books/supplier/entries/{purchase_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, lot) = call(
        &app,
        Method::POST,
        &format!("/api/stock/{id}/status"),
        Some(json!({ "status": "available" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lot["status"], "AVAILABLE");

    let (_, summary) = call(&app, Method::GET, "/api/stock/summary", None).await;
    assert_eq!(summary["available"]["quantity"], 10.0);
    assert_eq!(summary["available"]["value_minor"], 260000);
    assert_eq!(summary["by_product"]["Cement"]["total_purchased"], 10.0);

    let (_, paid) = call(
        &app,
        Method::POST,
        "/api/stock/manual-paid",
        Some(json!({ "amount": "99.99" })),
    )
    .await;
    assert_eq!(paid["manual_paid_minor"], 9999);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/stock/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, statement) = call(&app, Method::GET, "/api/books/supplier/accounts/Acme", None).await;
    assert!(statement["entries"].as_array().unwrap().is_empty());

    let (_, list) = call(&app, Method::GET, "/api/stock", None).await;
    assert!(list["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stock_validation_is_422() {
    let app = app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/stock",
        Some(json!({ "product_type": "Cement", "purchase_date": "2024-03-01", "quantity": "", "purchase_rate": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Missing field: quantity");
}
