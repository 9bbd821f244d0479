//! Census ingestion endpoints
//!
//! - `POST /api/census`: CSV text body, bulk ingest
//! - `POST /api/profile`: flat JSON object keyed by survey headers
//! - `GET /api/directory`: current directory, no ingest

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use super::error::{ApiError, ApiResult};
use crate::census::{parse_census_str, CensusField, OutputDirectory, RawRow};
use crate::AppState;

/// Response for both ingestion endpoints
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub total_records: usize,
    /// Regenerated directory, offered to the admin as a download
    pub json_data: OutputDirectory,
}

/// POST /api/census
pub async fn upload_census(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<IngestResponse>> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("No census file uploaded.".to_string()));
    }

    let rows = parse_census_str(&body)?;
    if rows.is_empty() {
        return Err(ApiError::BadRequest(
            "CSV file is empty or contains no data rows.".to_string(),
        ));
    }

    let report = state.pipeline.ingest_batch(&rows).await?;
    info!(
        "Census upload: {} rows, {} profiles written",
        report.rows_received,
        report.processed()
    );

    Ok(Json(IngestResponse {
        message: format!(
            "{} profiles processed from CSV. Total {} profiles in cleaned census.",
            report.processed(),
            report.total_records
        ),
        skipped: report.skipped,
        inserted: report.inserted,
        updated: report.updated,
        total_records: report.total_records,
        json_data: report.directory,
    }))
}

/// POST /api/profile
pub async fn add_profile(
    State(state): State<AppState>,
    Json(submission): Json<Map<String, Value>>,
) -> ApiResult<Json<IngestResponse>> {
    let row = RawRow::from_json_object(submission);
    if row.is_blank() {
        return Err(ApiError::BadRequest(
            "Profile submission contains no values.".to_string(),
        ));
    }

    let name = row
        .field(CensusField::FullName)
        .unwrap_or("unnamed student")
        .to_string();
    let report = state.pipeline.ingest_one(&row).await?;

    Ok(Json(IngestResponse {
        message: format!(
            "Profile for {} processed. Total {} profiles in cleaned census.",
            name, report.total_records
        ),
        skipped: report.skipped,
        inserted: report.inserted,
        updated: report.updated,
        total_records: report.total_records,
        json_data: report.directory,
    }))
}

/// GET /api/directory
pub async fn get_directory(State(state): State<AppState>) -> ApiResult<Json<OutputDirectory>> {
    Ok(Json(state.pipeline.directory().await?))
}
