//! In-process store with the same ownership and uniqueness rules as the
//! Postgres repositories. Used for local development without a database and
//! by the test suite.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewTransaction, NewUser, Transaction, TransactionChanges, TransactionKind, TransactionTotals,
    User,
};
use crate::database::repository::{TransactionRepository, UserRepository};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    transactions: BTreeMap<i64, Transaction>,
    last_user_id: i64,
    last_transaction_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.last_user_id,
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn list(&self, owner_id: i64) -> Result<Vec<Transaction>, DatabaseError> {
        let state = self.state.read().await;
        let mut owned: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.user_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn insert(&self, owner_id: i64, transaction: NewTransaction) -> Result<Transaction, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&owner_id) {
            return Err(DatabaseError::Conflict(format!("user {} does not exist", owner_id)));
        }

        state.last_transaction_id += 1;
        let now = Utc::now();
        let created = Transaction {
            id: state.last_transaction_id,
            user_id: owner_id,
            kind: transaction.kind,
            amount: transaction.amount,
            description: transaction.description,
            date: transaction.date,
            created_at: now,
            updated_at: now,
        };
        state.transactions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: TransactionChanges,
    ) -> Result<Option<Transaction>, DatabaseError> {
        let mut state = self.state.write().await;
        match state.transactions.get_mut(&id) {
            Some(existing) if existing.user_id == owner_id => {
                changes.apply_to(existing);
                existing.updated_at = Utc::now();
                Ok(Some(existing.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let owned = state
            .transactions
            .get(&id)
            .map(|t| t.user_id == owner_id)
            .unwrap_or(false);
        if owned {
            state.transactions.remove(&id);
        }
        Ok(owned)
    }

    async fn totals(&self, owner_id: i64) -> Result<TransactionTotals, DatabaseError> {
        let state = self.state.read().await;
        let mut totals = TransactionTotals {
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            count: 0,
        };
        for t in state.transactions.values().filter(|t| t.user_id == owner_id) {
            match t.kind {
                TransactionKind::Income => totals.income += t.amount,
                TransactionKind::Expense => totals.expense += t.amount,
            }
            totals.count += 1;
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn store_with_users() -> (MemoryStore, i64, i64) {
        let store = MemoryStore::new();
        let alice = UserRepository::create(
            &store,
            NewUser { username: "alice".into(), password_hash: "h".into() },
        )
        .await
        .unwrap();
        let bob = UserRepository::create(
            &store,
            NewUser { username: "bob".into(), password_hash: "h".into() },
        )
        .await
        .unwrap();
        (store, alice.id, bob.id)
    }

    fn new_tx(kind: TransactionKind, cents: i64, day: u32) -> NewTransaction {
        NewTransaction {
            kind,
            amount: Decimal::new(cents, 2),
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (store, _, _) = store_with_users().await;
        let result = UserRepository::create(
            &store,
            NewUser { username: "alice".into(), password_hash: "x".into() },
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let (store, _, _) = store_with_users().await;
        let result = UserRepository::create(
            &store,
            NewUser { username: "Alice".into(), password_hash: "x".into() },
        )
        .await;
        assert!(result.is_ok());
        assert!(store.find_by_username("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rows_are_scoped_to_owner() {
        let (store, alice, bob) = store_with_users().await;
        let bobs = store.insert(bob, new_tx(TransactionKind::Income, 500, 1)).await.unwrap();

        assert!(store.list(alice).await.unwrap().is_empty());
        assert!(store
            .update(alice, bobs.id, TransactionChanges { amount: Some(Decimal::ONE), ..Default::default() })
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(alice, bobs.id).await.unwrap());

        let untouched = store.list(bob).await.unwrap();
        assert_eq!(untouched, vec![bobs]);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (store, alice, _) = store_with_users().await;
        store.insert(alice, new_tx(TransactionKind::Income, 100, 1)).await.unwrap();
        store.insert(alice, new_tx(TransactionKind::Expense, 100, 3)).await.unwrap();
        store.insert(alice, new_tx(TransactionKind::Expense, 100, 2)).await.unwrap();

        let days: Vec<u32> = store
            .list(alice)
            .await
            .unwrap()
            .iter()
            .map(|t| chrono::Datelike::day(&t.date))
            .collect();
        assert_eq!(days, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn totals_split_by_kind() {
        let (store, alice, bob) = store_with_users().await;
        store.insert(alice, new_tx(TransactionKind::Income, 10000, 1)).await.unwrap();
        store.insert(alice, new_tx(TransactionKind::Expense, 2550, 2)).await.unwrap();
        store.insert(bob, new_tx(TransactionKind::Income, 99999, 2)).await.unwrap();

        let totals = store.totals(alice).await.unwrap();
        assert_eq!(totals.income, Decimal::new(10000, 2));
        assert_eq!(totals.expense, Decimal::new(2550, 2));
        assert_eq!(totals.count, 2);
    }
}
