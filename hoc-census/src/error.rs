//! Error types for the census pipeline
//!
//! Blank rows are not errors; they are counted as skipped in the ingest
//! report. Field-level garbage never errors either: derivation resolves it
//! to sentinels.

use crate::store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CensusError>;

#[derive(Debug, Error)]
pub enum CensusError {
    /// A write for one row failed; the rest of the batch was not processed
    #[error("Failed to persist record for {student} ({key}): {source}")]
    Persistence {
        student: String,
        key: String,
        #[source]
        source: StoreError,
    },

    /// Reading back the full record set failed
    #[error("Failed to fetch census records: {0}")]
    Fetch(#[source] StoreError),

    /// Malformed tabular input, rejected before any row is processed
    #[error("Malformed census input at row {row}{}: {message}", .column.as_ref().map(|c| format!(", column '{}'", c)).unwrap_or_default())]
    Parse {
        row: usize,
        column: Option<String>,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
