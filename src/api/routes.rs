//! API Routes
//!
//! HTTP endpoint definitions for the banking demo surface.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, TransactionRecord, TransactionType};
use crate::error::{AppError, AppResult};
use crate::service::TransactionService;
use crate::store::AccountStore;

/// Shared handler state: the account store behind its trait.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

/// Fields arrive as raw JSON values and are coerced in the handler. The
/// original clients were loose about numbers versus strings, so both are
/// accepted; anything else is a validation failure rather than a body
/// rejection.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub account_id: Option<serde_json::Value>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<serde_json::Value>,
}

/// Account ids may be JSON integers or strings holding one. Fractional
/// numbers never coerce.
fn parse_account_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Amounts may be JSON numbers or decimal strings. Numbers go through their
/// literal text so 30.1 stays 30.1 rather than picking up float
/// representation noise.
fn parse_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub message: String,
    #[serde(rename = "newBalance")]
    pub new_balance: Decimal,
}

// =========================================================================
// Router
// =========================================================================

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account endpoints
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/transactions/:id", get(account_transactions))
        .route("/api/accounts/transaction", post(do_transaction))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// =========================================================================
// GET /api/accounts
// =========================================================================

/// List all accounts, id ascending.
async fn list_accounts(State(state): State<AppState>) -> AppResult<Json<Vec<Account>>> {
    Ok(Json(state.store.list().await?))
}

// =========================================================================
// GET /api/accounts/transactions/:id
// =========================================================================

/// Transaction history for one account, newest first. An account with no
/// history (including an unknown account) yields an empty list.
async fn account_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> AppResult<Json<Vec<TransactionRecord>>> {
    Ok(Json(state.store.transactions_for(account_id).await?))
}

// =========================================================================
// POST /api/accounts/transaction
// =========================================================================

/// Apply a deposit or withdrawal to an account.
async fn do_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let (Some(account_id), Some(amount), Some(kind)) =
        (&request.account_id, &request.amount, &request.kind)
    else {
        return Err(AppError::InvalidRequest(
            "account_id, amount, and type are required".to_string(),
        ));
    };

    let account_id = parse_account_id(account_id).ok_or_else(|| {
        AppError::InvalidRequest("account_id must be an integer".to_string())
    })?;
    let amount = parse_decimal(amount)
        .ok_or_else(|| AppError::InvalidRequest("amount must be a number".to_string()))?;
    let kind = kind
        .as_str()
        .ok_or_else(|| AppError::InvalidRequest("type must be a string".to_string()))?;
    let kind = TransactionType::from_str(kind)?;

    let service = TransactionService::new(Arc::clone(&state.store));
    let applied = service.apply(account_id, amount, kind).await?;

    Ok(Json(TransactionResponse {
        message: "Transaction successful".to_string(),
        new_balance: applied.new_balance,
    }))
}
