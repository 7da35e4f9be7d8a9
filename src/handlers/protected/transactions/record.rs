use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};

use super::utils::parse_transaction_id;
use crate::database::models::{Transaction, TransactionPayload};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Message};
use crate::state::AppState;

/// PUT /api/transactions/:id - Partially update one of the caller's transactions
///
/// Only fields present in the body change. A record that does not exist and
/// one owned by someone else both answer 404.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> ApiResult<Transaction> {
    let id = parse_transaction_id(&id)?;
    let Json(payload) = payload?;

    let updated = state.transactions.update(user.id, id, payload).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/transactions/:id - Remove one of the caller's transactions
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let id = parse_transaction_id(&id)?;

    state.transactions.delete(user.id, id).await?;
    Ok(ApiResponse::success(Message::new("Deleted")))
}
