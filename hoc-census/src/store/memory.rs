//! In-process store
//!
//! Backs dry runs and tests. Each instance is independent; nothing is shared
//! between instances.

use super::{CensusStore, StoreError, UpsertOutcome};
use crate::census::{CanonicalStudentRecord, RawRow, StudentKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One entry of the raw row log
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogEntry {
    pub batch_id: Uuid,
    pub row: RawRow,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<StudentKey, CanonicalStudentRecord>>,
    raw_log: RwLock<Vec<RawLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, key: &StudentKey) -> Option<CanonicalStudentRecord> {
        self.records.read().await.get(key).cloned()
    }

    /// Snapshot of the raw row log in append order
    pub async fn raw_log(&self) -> Vec<RawLogEntry> {
        self.raw_log.read().await.clone()
    }
}

#[async_trait]
impl CensusStore for MemoryStore {
    async fn append_raw(&self, batch_id: Uuid, row: &RawRow) -> Result<(), StoreError> {
        self.raw_log.write().await.push(RawLogEntry {
            batch_id,
            row: row.clone(),
            uploaded_at: hoc_common::time::now(),
        });
        Ok(())
    }

    async fn upsert(&self, record: &CanonicalStudentRecord) -> Result<UpsertOutcome, StoreError> {
        let previous = self
            .records
            .write()
            .await
            .insert(record.key.clone(), record.clone());

        Ok(match previous {
            None => UpsertOutcome::Inserted,
            Some(old) => UpsertOutcome::Updated {
                previous_name: old.profile.name,
            },
        })
    }

    async fn fetch_all(&self) -> Result<Vec<CanonicalStudentRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
