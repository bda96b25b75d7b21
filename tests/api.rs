//! API endpoint tests
//!
//! Exercise the full HTTP surface over the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use bms_backend::api::{router, AppState};
use bms_backend::store::MemoryAccountStore;

fn test_app() -> (Router, MemoryAccountStore) {
    let store = MemoryAccountStore::new();
    let app = router(AppState::new(Arc::new(store.clone())));
    (app, store)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_transaction(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/accounts/transaction")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn decimal_field(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).unwrap()
}

#[tokio::test]
async fn health_check_responds() {
    let (app, _store) = test_app();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_accounts_in_id_order() {
    let (app, store) = test_app();
    store.insert_account("Checking", dec!(100.00));
    store.insert_account("Savings", dec!(250.00));

    let (status, body) = get_json(&app, "/api/accounts").await;
    assert_eq!(status, StatusCode::OK);

    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["name"], "Checking");
    assert_eq!(accounts[1]["name"], "Savings");
    assert!(accounts[0]["id"].as_i64().unwrap() < accounts[1]["id"].as_i64().unwrap());
    assert_eq!(decimal_field(&accounts[0]["balance"]), dec!(100.00));
}

#[tokio::test]
async fn deposit_returns_new_balance_and_logs_entry() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    let (status, body) = post_transaction(
        &app,
        json!({"account_id": account.id, "amount": 30, "type": "DEPOSIT"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transaction successful");
    assert_eq!(decimal_field(&body["newBalance"]), dec!(130.00));

    let (status, log) = get_json(
        &app,
        &format!("/api/accounts/transactions/{}", account.id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = log.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["account_id"].as_i64().unwrap(), account.id);
    assert_eq!(entries[0]["type"], "DEPOSIT");
    assert_eq!(decimal_field(&entries[0]["amount"]), dec!(30));
    assert!(entries[0]["transaction_date"].is_string());
}

#[tokio::test]
async fn overdraw_returns_400_and_changes_nothing() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    let (status, body) = post_transaction(
        &app,
        json!({"account_id": account.id, "amount": 150, "type": "WITHDRAW"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "insufficient_balance");

    let (_, accounts) = get_json(&app, "/api/accounts").await;
    assert_eq!(decimal_field(&accounts[0]["balance"]), dec!(100.00));

    let (_, log) = get_json(
        &app,
        &format!("/api/accounts/transactions/{}", account.id),
    )
    .await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_account_returns_404() {
    let (app, _store) = test_app();

    let (status, body) = post_transaction(
        &app,
        json!({"account_id": 999, "amount": 10, "type": "DEPOSIT"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "account_not_found");
}

#[tokio::test]
async fn missing_fields_return_400() {
    let (app, _store) = test_app();

    let (status, body) = post_transaction(&app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn non_positive_amount_returns_400() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    for amount in [json!(-5), json!(0)] {
        let (status, body) = post_transaction(
            &app,
            json!({"account_id": account.id, "amount": amount, "type": "DEPOSIT"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_request");
    }

    let (_, log) = get_json(
        &app,
        &format!("/api/accounts/transactions/{}", account.id),
    )
    .await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_typed_fields_return_400() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    let (status, body) = post_transaction(
        &app,
        json!({"account_id": account.id, "amount": true, "type": "DEPOSIT"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");

    let (status, body) = post_transaction(
        &app,
        json!({"account_id": account.id, "amount": 10, "type": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "invalid_request");
}

#[tokio::test]
async fn unrecognized_type_returns_400() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    for bad in ["TRANSFER", "deposit", ""] {
        let (status, body) = post_transaction(
            &app,
            json!({"account_id": account.id, "amount": 10, "type": bad}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "type {bad:?}");
        assert_eq!(body["error_code"], "invalid_type");
    }
}

#[tokio::test]
async fn string_typed_fields_are_coerced() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    let (status, body) = post_transaction(
        &app,
        json!({
            "account_id": account.id.to_string(),
            "amount": "30.50",
            "type": "WITHDRAW"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal_field(&body["newBalance"]), dec!(69.50));
}

#[tokio::test]
async fn history_is_newest_first() {
    let (app, store) = test_app();
    let account = store.insert_account("Checking", dec!(100.00));

    for amount in [10, 20, 30] {
        let (status, _) = post_transaction(
            &app,
            json!({"account_id": account.id, "amount": amount, "type": "DEPOSIT"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, log) = get_json(
        &app,
        &format!("/api/accounts/transactions/{}", account.id),
    )
    .await;
    let amounts: Vec<Decimal> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| decimal_field(&entry["amount"]))
        .collect();
    assert_eq!(amounts, vec![dec!(30), dec!(20), dec!(10)]);
}

#[tokio::test]
async fn unknown_account_history_is_empty() {
    let (app, _store) = test_app();

    let (status, log) = get_json(&app, "/api/accounts/transactions/999").await;
    assert_eq!(status, StatusCode::OK);
    assert!(log.as_array().unwrap().is_empty());
}
