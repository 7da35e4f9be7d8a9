pub mod credential_service;
pub mod transaction_service;
pub mod validation;

use std::collections::HashMap;
use thiserror::Error;

use crate::database::DatabaseError;

pub use credential_service::{CredentialService, Credentials};
pub use transaction_service::TransactionService;

/// Failures of a service operation, independent of transport
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors,
        }
    }
}
