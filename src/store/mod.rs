//! Durable store backing the outcome history, configuration catalog, domain
//! records, domain similarity graph, and job queue.
//!
//! Grounded in `link_index::LinkIndex::open`: a single `SqlitePool` opened
//! with WAL journaling and a busy timeout so concurrent workers don't
//! spuriously fail under write contention, with schema creation run inline
//! as `CREATE TABLE IF NOT EXISTS` rather than through a migration runner.

pub mod configurations;
pub mod job_queue;
pub mod outcome_store;
pub mod schema;
pub mod similarity;
pub mod types;

pub use types::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("job {job_id} is not owned by worker {worker_id}")]
    OwnershipMismatch { job_id: String, worker_id: String },

    #[error("dependency {0} is not done")]
    DependencyUnmet(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the durable store. Cheaply cloneable; wraps a pooled connection.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if absent) the SQLite database at `path` and ensure
    /// the schema exists.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
            .map_err(StoreError::Database)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;

        sqlx::query(schema::SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database. Used by tests that don't need durability
    /// across process restarts.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::query(schema::SCHEMA_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
