pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Identity asserted by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Access token required")]
    Missing,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Signing and verification keys for HS256 session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        let lifetime = i64::try_from(security.jwt_expiry_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                TokenError::Generation(format!("token lifetime of {}s is out of range", security.jwt_expiry_secs))
            })?;
        Self::new(&security.jwt_secret, lifetime)
    }

    pub fn issue(&self, user_id: i64, username: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Sign a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::Generation("token expiry overflows the calendar".to_string()))?;

        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Check the signature and expiry of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}
