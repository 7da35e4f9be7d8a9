use std::sync::Arc;

use crate::auth::{TokenError, TokenKeys};
use crate::config::AppConfig;
use crate::database::Repositories;
use crate::services::{CredentialService, TransactionService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repositories: Repositories,
    pub credentials: Arc<CredentialService>,
    pub transactions: Arc<TransactionService>,
}

impl AppState {
    /// Wire services onto the given repositories
    pub fn new(config: AppConfig, repositories: Repositories) -> Result<Self, TokenError> {
        let tokens = TokenKeys::from_config(&config.security)?;

        Ok(Self {
            credentials: Arc::new(CredentialService::new(repositories.users.clone(), tokens)),
            transactions: Arc::new(TransactionService::new(repositories.transactions.clone())),
            config: Arc::new(config),
            repositories,
        })
    }
}
