use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// No token is 401; a token that fails verification is 403.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let claims = state.credentials.verify(token).map_err(|e| {
        tracing::warn!("Rejected token for {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated user {} ({})", auth_user.username, auth_user.id);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme name is matched case-insensitively.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(TokenError::Missing)?;

    match auth_str.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(TokenError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers("bearer abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers("BEARER abc.def.ghi")), Ok("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers("Bearertoken")), Err(TokenError::Missing));
    }

    #[test]
    fn missing_or_malformed_header_is_missing_token() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err(TokenError::Missing));
        assert_eq!(extract_bearer_token(&headers("Bearer ")), Err(TokenError::Missing));
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwdw==")), Err(TokenError::Missing));
    }
}
