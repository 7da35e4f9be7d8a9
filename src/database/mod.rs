pub mod manager;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod repository;

use sqlx::PgPool;
use std::sync::Arc;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use repository::{TransactionRepository, UserRepository};

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// Repository handles built once at startup and shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    backend: Backend,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            transactions: Arc::new(postgres::PgTransactionRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            transactions: store,
            backend: Backend::Memory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }

    pub async fn close(&self) {
        if let Backend::Postgres(pool) = &self.backend {
            pool.close().await;
        }
    }
}
