use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::auth::{password, Claims, IssuedToken, TokenError, TokenKeys};
use crate::database::models::{NewUser, Profile};
use crate::database::{DatabaseError, UserRepository};

const MAX_USERNAME_LEN: usize = 255;

/// Register/login body. Fields are optional so a missing one is a validation
/// error rather than a JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    fn require(self) -> Result<(String, String), ServiceError> {
        let mut field_errors = HashMap::new();

        let username = self.username.filter(|u| !u.trim().is_empty());
        let password = self.password.filter(|p| !p.is_empty());

        if username.is_none() {
            field_errors.insert("username".to_string(), "is required".to_string());
        }
        if password.is_none() {
            field_errors.insert("password".to_string(), "is required".to_string());
        }
        if let Some(u) = &username {
            if u.contains('\0') {
                field_errors.insert("username".to_string(), "must not contain NUL characters".to_string());
            } else if u.chars().count() > MAX_USERNAME_LEN {
                field_errors.insert(
                    "username".to_string(),
                    format!("must be at most {} characters", MAX_USERNAME_LEN),
                );
            }
        }

        match (username, password) {
            (Some(u), Some(p)) if field_errors.is_empty() => Ok((u, p)),
            _ => Err(ServiceError::validation("Username and password required", field_errors)),
        }
    }
}

/// Owns user identity: registration, login and session token checks.
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    tokens: TokenKeys,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenKeys) -> Self {
        Self { users, tokens }
    }

    /// Store a new user with a hashed password. Returns nothing sensitive.
    pub async fn register(&self, credentials: Credentials) -> Result<Profile, ServiceError> {
        let (username, password) = credentials.require()?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // The unique index still decides when two registrations race.
        let user = self
            .users
            .create(NewUser {
                username,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => ServiceError::Conflict("User already exists".to_string()),
                other => ServiceError::Database(other),
            })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user.into())
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, credentials: Credentials) -> Result<IssuedToken, ServiceError> {
        let (username, password) = credentials.require()?;

        let Some(user) = self.users.find_by_username(&username).await? else {
            warn!("Login failed for {}", username);
            return Err(ServiceError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::Internal(format!("password check task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!("Stored hash for user {} is unreadable: {}", user.id, e);
                ServiceError::Internal("credential check failed".to_string())
            })?;

        if !valid {
            warn!("Login failed for {}", username);
            return Err(ServiceError::InvalidCredentials);
        }

        let issued = self
            .tokens
            .issue(user.id, &user.username)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!("User {} logged in", user.username);
        Ok(issued)
    }

    /// Verify a bearer token's signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.tokens.verify(token)
    }

    pub async fn profile(&self, user_id: i64) -> Result<Profile, ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(Profile::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use chrono::Duration;

    fn service() -> CredentialService {
        let keys = TokenKeys::new("test-secret", Duration::hours(1)).unwrap();
        CredentialService::new(Arc::new(MemoryStore::new()), keys)
    }

    #[tokio::test]
    async fn register_then_login() {
        let svc = service();
        let profile = svc.register(Credentials::new("alice", "pw1")).await.unwrap();
        assert_eq!(profile.username, "alice");

        let issued = svc.login(Credentials::new("alice", "pw1")).await.unwrap();
        let claims = svc.verify(&issued.token).unwrap();
        assert_eq!(claims.id, profile.id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = service();
        svc.register(Credentials::new("alice", "pw1")).await.unwrap();
        let err = svc.register(Credentials::new("alice", "other")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_fields_are_validation_errors() {
        let svc = service();
        let err = svc.register(Credentials::new("", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let err = svc.register(Credentials::new("bob", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));

        let err = svc.login(Credentials::default()).await.unwrap_err();
        match err {
            ServiceError::Validation { field_errors, .. } => {
                assert!(field_errors.contains_key("username"));
                assert!(field_errors.contains_key("password"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn username_with_nul_is_a_validation_error() {
        let svc = service();
        let err = svc.register(Credentials::new("ali\0ce", "pw1")).await.unwrap_err();
        match err {
            ServiceError::Validation { field_errors, .. } => assert!(field_errors.contains_key("username")),
            other => panic!("unexpected {:?}", other),
        }
        let err = svc.login(Credentials::new("ali\0ce", "pw1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let svc = service();
        svc.register(Credentials::new("alice", "pw1")).await.unwrap();

        let wrong = svc.login(Credentials::new("alice", "nope")).await.unwrap_err();
        let unknown = svc.login(Credentials::new("mallory", "pw1")).await.unwrap_err();
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn profile_of_missing_user_is_not_found() {
        let svc = service();
        assert!(matches!(svc.profile(42).await, Err(ServiceError::NotFound(_))));
    }
}
