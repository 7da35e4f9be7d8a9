use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewTransaction, NewUser, Transaction, TransactionChanges, TransactionTotals, User,
};

/// User storage. Usernames are unique and compared case-sensitively.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; `DatabaseError::Conflict` if the username is taken
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
}

/// Transaction storage. Every method takes the owner id and only ever touches
/// rows whose `user_id` matches it.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// All rows for the owner, newest date first
    async fn list(&self, owner_id: i64) -> Result<Vec<Transaction>, DatabaseError>;

    async fn insert(&self, owner_id: i64, transaction: NewTransaction) -> Result<Transaction, DatabaseError>;

    /// `Ok(None)` when no row with `id` belongs to the owner
    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: TransactionChanges,
    ) -> Result<Option<Transaction>, DatabaseError>;

    /// `Ok(false)` when no row with `id` belongs to the owner
    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, DatabaseError>;

    async fn totals(&self, owner_id: i64) -> Result<TransactionTotals, DatabaseError>;
}
