//! Schema bootstrap.
//!
//! Every statement is idempotent, so running the list against an already
//! migrated database is a no-op.

use sqlx::PgPool;
use tracing::{debug, info};

use super::manager::DatabaseError;

/// A named, idempotent schema step
#[derive(Debug, Clone)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "create_users",
        sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(255) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    },
    Migration {
        name: "create_transactions",
        sql: r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                type VARCHAR(16) NOT NULL CHECK (type IN ('income', 'expense')),
                amount NUMERIC(10, 2) NOT NULL CHECK (amount > 0),
                description VARCHAR(255),
                date DATE NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
    },
    Migration {
        name: "index_transactions_user_date",
        sql: "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions (user_id, date DESC)",
    },
];

/// Apply every migration in order
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    for migration in MIGRATIONS {
        debug!("Applying migration {}", migration.name);
        sqlx::query(migration.sql)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", migration.name, e)))?;
    }
    info!("Database schema up to date ({} migrations)", MIGRATIONS.len());
    Ok(())
}
