// handlers/public/auth/register.rs - POST /api/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /api/register - Register a new user account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "pw1" }
/// ```
///
/// Responses:
/// - 201 `{ "message": "User created" }`
/// - 400 `VALIDATION_ERROR` when either field is empty
/// - 400 `CONFLICT` when the username is taken
///
/// Neither the password nor its hash is echoed back.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Message> {
    let Json(credentials) = payload?;

    state.credentials.register(credentials).await?;

    Ok(ApiResponse::created(Message::new("User created")))
}
