mod memory;
mod postgres;

use std::fmt;

use worldmap_shared::VisitRecord;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx_core::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
        }
    }
}

impl From<sqlx_core::Error> for StoreError {
    fn from(e: sqlx_core::Error) -> Self {
        StoreError::Database(e)
    }
}

/// Per-country visit counters.
pub enum VisitStore {
    /// Lost on restart.
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl VisitStore {
    pub fn backend(&self) -> &'static str {
        match self {
            VisitStore::Memory(_) => "memory",
            VisitStore::Postgres(_) => "postgres",
        }
    }

    /// Record one visit and return the country's new total.
    pub async fn save(&self, country: &str) -> Result<i64, StoreError> {
        match self {
            VisitStore::Memory(store) => Ok(store.save(country)),
            VisitStore::Postgres(store) => store.save(country).await,
        }
    }

    /// Every country with a counter, ordered by name.
    pub async fn results(&self) -> Result<Vec<VisitRecord>, StoreError> {
        match self {
            VisitStore::Memory(store) => Ok(store.results()),
            VisitStore::Postgres(store) => store.results().await,
        }
    }

    /// Number of countries with at least one visit.
    pub async fn unique_total(&self) -> Result<u64, StoreError> {
        match self {
            VisitStore::Memory(store) => Ok(store.unique_total()),
            VisitStore::Postgres(store) => store.unique_total().await,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            VisitStore::Memory(_) => Ok(()),
            VisitStore::Postgres(store) => store.ping().await,
        }
    }
}
