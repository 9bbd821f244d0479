//! Batch orchestration: rows -> mapper -> store -> read-back -> directory
//!
//! One sequential pass per call. Each non-blank row is logged raw, mapped
//! and upserted in input order; the first store failure aborts the rest of
//! the batch. After the writes, the full record set is read back and
//! aggregated, so the directory always reflects store state exactly.
//!
//! Bulk and single-profile ingestion share the same row handler.

use super::clock::{Clock, SystemClock};
use super::directory::{aggregate, OutputDirectory};
use super::fields::{CensusField, RawRow};
use super::keys::{is_unknown_student_id, UNKNOWN_ACADEMIC_YEAR, UNKNOWN_MAJOR_KEY};
use super::mapper::map_row_to_record;
use super::record::CanonicalStudentRecord;
use crate::error::{CensusError, Result};
use crate::store::{CensusStore, StoreError, UpsertOutcome};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Summary of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub batch_id: Uuid,
    pub rows_received: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Canonical records in the store after the run
    pub total_records: usize,
    pub directory: OutputDirectory,
}

impl IngestReport {
    /// Rows that reached the store
    pub fn processed(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Debug, Default)]
struct RowCounts {
    skipped: usize,
    inserted: usize,
    updated: usize,
}

#[derive(Clone)]
pub struct CensusPipeline {
    store: Arc<dyn CensusStore>,
    clock: Arc<dyn Clock>,
}

impl CensusPipeline {
    pub fn new(store: Arc<dyn CensusStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for unknown-student ids
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn CensusStore> {
        &self.store
    }

    /// Ingest a census batch and return the regenerated directory
    pub async fn process_batch(&self, rows: &[RawRow]) -> Result<OutputDirectory> {
        Ok(self.ingest_batch(rows).await?.directory)
    }

    /// Ingest one submitted profile and return the regenerated directory
    pub async fn process_one(&self, row: &RawRow) -> Result<OutputDirectory> {
        Ok(self.ingest_one(row).await?.directory)
    }

    pub async fn ingest_one(&self, row: &RawRow) -> Result<IngestReport> {
        self.ingest_batch(std::slice::from_ref(row)).await
    }

    /// Ingest a batch, returning counts alongside the directory
    pub async fn ingest_batch(&self, rows: &[RawRow]) -> Result<IngestReport> {
        let batch_id = Uuid::new_v4();
        let mut counts = RowCounts::default();

        info!(%batch_id, rows = rows.len(), "Starting census ingest");

        for (index, row) in rows.iter().enumerate() {
            self.ingest_row(batch_id, index + 1, row, &mut counts).await?;
        }

        let records = self.fetch_all().await?;
        let directory = aggregate(&records);

        let report = IngestReport {
            batch_id,
            rows_received: rows.len(),
            skipped: counts.skipped,
            inserted: counts.inserted,
            updated: counts.updated,
            total_records: records.len(),
            directory,
        };

        info!(
            %batch_id,
            rows = report.rows_received,
            skipped = report.skipped,
            inserted = report.inserted,
            updated = report.updated,
            total = report.total_records,
            "Census ingest complete"
        );

        Ok(report)
    }

    /// Current directory without ingesting anything
    pub async fn directory(&self) -> Result<OutputDirectory> {
        let records = self.fetch_all().await?;
        Ok(aggregate(&records))
    }

    async fn fetch_all(&self) -> Result<Vec<CanonicalStudentRecord>> {
        self.store.fetch_all().await.map_err(|e| {
            error!("Failed to read back census records: {}", e);
            CensusError::Fetch(e)
        })
    }

    async fn ingest_row(
        &self,
        batch_id: Uuid,
        row_number: usize,
        row: &RawRow,
        counts: &mut RowCounts,
    ) -> Result<()> {
        if row.is_blank() {
            debug!(row = row_number, "Skipping blank row");
            counts.skipped += 1;
            return Ok(());
        }

        let record = map_row_to_record(row, self.clock.as_ref());
        warn_on_sentinels(row_number, row, &record);

        let persistence_error = |source: StoreError| {
            error!(
                row = row_number,
                key = %record.key,
                "Failed to persist record for {}: {}",
                record.display_name(),
                source
            );
            CensusError::Persistence {
                student: record.display_name().to_string(),
                key: record.key.to_string(),
                source,
            }
        };

        self.store
            .append_raw(batch_id, row)
            .await
            .map_err(persistence_error)?;

        match self.store.upsert(&record).await.map_err(persistence_error)? {
            UpsertOutcome::Inserted => {
                debug!(row = row_number, key = %record.key, "Inserted record");
                counts.inserted += 1;
            }
            UpsertOutcome::Updated { previous_name } => {
                if previous_name.as_deref() != record.profile.name.as_deref() {
                    warn!(
                        row = row_number,
                        key = %record.key,
                        "Record previously held {:?} was overwritten by {:?}; possible identity collision",
                        previous_name,
                        record.profile.name
                    );
                } else {
                    debug!(row = row_number, key = %record.key, "Updated record");
                }
                counts.updated += 1;
            }
        }

        Ok(())
    }
}

fn warn_on_sentinels(row_number: usize, row: &RawRow, record: &CanonicalStudentRecord) {
    if is_unknown_student_id(&record.key.student_id) {
        warn!(row = row_number, "No usable name; assigned {}", record.key.student_id);
    }
    if record.key.academic_year_key == UNKNOWN_ACADEMIC_YEAR {
        warn!(
            row = row_number,
            "Unrecognized intake batch {:?} for {}",
            row.field(CensusField::IntakeBatch),
            record.display_name()
        );
    }
    if record.key.major_abbreviation_key == UNKNOWN_MAJOR_KEY {
        warn!(
            row = row_number,
            "Unrecognized course {:?} for {}",
            row.field(CensusField::Course),
            record.display_name()
        );
    }
}
