// handlers/public/auth/login.rs - POST /api/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::IssuedToken;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /api/login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "pw1" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 3600 }
/// ```
///
/// An unknown username and a wrong password both yield 400
/// `INVALID_CREDENTIALS` with the same message.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<IssuedToken> {
    let Json(credentials) = payload?;

    let issued = state.credentials.login(credentials).await?;

    Ok(ApiResponse::success(issued))
}
