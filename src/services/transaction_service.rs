use std::sync::Arc;
use tracing::debug;

use super::{validation, ServiceError};
use crate::database::models::{Summary, Transaction, TransactionPayload};
use crate::database::TransactionRepository;

/// Per-user transaction records. The owner id always comes from a verified
/// session, never from the request body.
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
}

impl TransactionService {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self.transactions.list(owner_id).await?)
    }

    pub async fn create(&self, owner_id: i64, payload: TransactionPayload) -> Result<Transaction, ServiceError> {
        let new = validation::new_transaction(payload)?;
        let created = self.transactions.insert(owner_id, new).await?;
        debug!("User {} created transaction {}", owner_id, created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        payload: TransactionPayload,
    ) -> Result<Transaction, ServiceError> {
        let changes = validation::transaction_changes(payload)?;
        let updated = self
            .transactions
            .update(owner_id, id, changes)
            .await?
            .ok_or_else(not_found)?;
        debug!("User {} updated transaction {}", owner_id, id);
        Ok(updated)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), ServiceError> {
        if !self.transactions.delete(owner_id, id).await? {
            return Err(not_found());
        }
        debug!("User {} deleted transaction {}", owner_id, id);
        Ok(())
    }

    pub async fn summary(&self, owner_id: i64) -> Result<Summary, ServiceError> {
        Ok(self.transactions.totals(owner_id).await?.into())
    }
}

// Absent and not-owned are indistinguishable to the caller.
fn not_found() -> ServiceError {
    ServiceError::NotFound("Transaction not found".to_string())
}
