use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};

use crate::database::models::{Summary, Transaction, TransactionPayload};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/transactions - All of the caller's transactions, newest date first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Transaction>> {
    let transactions = state.transactions.list(user.id).await?;
    Ok(ApiResponse::success(transactions))
}

/// POST /api/transactions - Record a transaction owned by the caller
///
/// Expected Input:
/// ```json
/// { "type": "income", "amount": 100, "description": "salary", "date": "2024-01-01" }
/// ```
///
/// `type`, `amount` and `date` are required; `amount` may be a number or a
/// numeric string. Returns 201 with the stored record including its id.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> ApiResult<Transaction> {
    let Json(payload) = payload?;
    let created = state.transactions.create(user.id, payload).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/transactions/summary - Income, expense and balance totals
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Summary> {
    let summary = state.transactions.summary(user.id).await?;
    Ok(ApiResponse::success(summary))
}
