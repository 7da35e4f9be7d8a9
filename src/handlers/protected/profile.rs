use axum::extract::{Extension, State};

use crate::database::models::Profile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/profile - Current user's id and username
///
/// Read from the users table rather than echoed from the token, so a user
/// that no longer exists gets 404.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let profile = state.credentials.profile(user.id).await?;
    Ok(ApiResponse::success(profile))
}
