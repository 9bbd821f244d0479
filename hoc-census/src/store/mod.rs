//! Persistence boundary for the census pipeline
//!
//! Two logical collections sit behind a store:
//! - an append-only raw row log (audit only, never read back by the pipeline)
//! - the canonical record set, keyed by [`StudentKey`](crate::census::StudentKey)
//!
//! The pipeline holds a store as `Arc<dyn CensusStore>`; each test can pass
//! its own isolated instance.

use crate::census::{CanonicalStudentRecord, RawRow};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteCensusStore;

/// Store read/write failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What an upsert did to the canonical record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// An existing record with the same key was replaced
    Updated { previous_name: Option<String> },
}

#[async_trait]
pub trait CensusStore: Send + Sync {
    /// Append one raw row to the audit log
    async fn append_raw(&self, batch_id: Uuid, row: &RawRow) -> Result<(), StoreError>;

    /// Insert, or replace every field of the record with the same composite key
    async fn upsert(&self, record: &CanonicalStudentRecord) -> Result<UpsertOutcome, StoreError>;

    /// Every current canonical record, in no particular order
    async fn fetch_all(&self) -> Result<Vec<CanonicalStudentRecord>, StoreError>;
}
