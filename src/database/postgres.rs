//! Postgres-backed repositories.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewTransaction, NewUser, Transaction, TransactionChanges, TransactionTotals, User,
};
use crate::database::repository::{TransactionRepository, UserRepository};

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount, description, date, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("username '{}' already exists", user.username))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

/// Row as stored; `type` is decoded into `TransactionKind` afterwards.
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    amount: Decimal,
    description: Option<String>,
    date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DatabaseError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|e| DatabaseError::CorruptRow(format!("transaction {}: {}", row.id, e)))?;

        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            kind,
            amount: row.amount,
            description: row.description,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn list(&self, owner_id: i64) -> Result<Vec<Transaction>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = $1 ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        );

        sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn insert(&self, owner_id: i64, transaction: NewTransaction) -> Result<Transaction, DatabaseError> {
        let sql = format!(
            "INSERT INTO transactions (user_id, type, amount, description, date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TRANSACTION_COLUMNS
        );

        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(owner_id)
            .bind(transaction.kind.as_str())
            .bind(transaction.amount)
            .bind(&transaction.description)
            .bind(transaction.date)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: TransactionChanges,
    ) -> Result<Option<Transaction>, DatabaseError> {
        // Absent fields keep their stored value; $5 says whether $6 replaces the description.
        let sql = format!(
            "UPDATE transactions SET \
                type = COALESCE($3, type), \
                amount = COALESCE($4, amount), \
                description = CASE WHEN $5 THEN $6 ELSE description END, \
                date = COALESCE($7, date), \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {}",
            TRANSACTION_COLUMNS
        );

        let (replace_description, description) = match changes.description {
            Some(description) => (true, description),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(changes.kind.map(|k| k.as_str()))
            .bind(changes.amount)
            .bind(replace_description)
            .bind(description)
            .bind(changes.date)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn delete(&self, owner_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn totals(&self, owner_id: i64) -> Result<TransactionTotals, DatabaseError> {
        let (income, expense, count) = sqlx::query_as::<_, (Decimal, Decimal, i64)>(
            "SELECT \
                COALESCE(SUM(amount) FILTER (WHERE type = 'income'), 0), \
                COALESCE(SUM(amount) FILTER (WHERE type = 'expense'), 0), \
                COUNT(*) \
             FROM transactions WHERE user_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionTotals { income, expense, count })
    }
}
