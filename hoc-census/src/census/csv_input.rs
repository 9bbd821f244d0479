//! Census spreadsheet (CSV export) reader
//!
//! The first line carries the survey-question headers; each following line
//! becomes one [`RawRow`]. Structural problems (ragged rows, invalid UTF-8,
//! missing identity headers) are rejected here with row/column context,
//! before any row reaches the pipeline.

use super::fields::{CensusField, RawRow};
use crate::error::{CensusError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

/// Headers a census file must carry for records to be identifiable
pub const REQUIRED_HEADERS: [CensusField; 3] = [
    CensusField::FullName,
    CensusField::Course,
    CensusField::IntakeBatch,
];

/// Parse CSV text into raw rows
pub fn parse_census_str(text: &str) -> Result<Vec<RawRow>> {
    parse_census_csv(text.as_bytes())
}

/// Parse a CSV stream into raw rows
pub fn parse_census_csv<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| read_error(0, None, e))?
        .clone();
    check_required_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row_number = index + 1;
        let record = result.map_err(|e| {
            let column = utf8_error_field(&e).and_then(|i| headers.get(i)).map(str::to_string);
            read_error(row_number, column, e)
        })?;

        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .collect::<RawRow>(),
        );
    }

    Ok(rows)
}

fn check_required_headers(headers: &StringRecord) -> Result<()> {
    for field in REQUIRED_HEADERS {
        let present = headers
            .iter()
            .any(|h| CensusField::from_label(h) == Some(field));
        if !present {
            return Err(CensusError::Parse {
                row: 0,
                column: Some(field.label().to_string()),
                message: "missing required header".to_string(),
            });
        }
    }
    Ok(())
}

fn utf8_error_field(err: &csv::Error) -> Option<usize> {
    match err.kind() {
        csv::ErrorKind::Utf8 { err, .. } => Some(err.field()),
        _ => None,
    }
}

/// Stream failures stay I/O errors; everything else is malformed input
fn read_error(row: usize, column: Option<String>, err: csv::Error) -> CensusError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => CensusError::Io(io),
        _ => CensusError::Parse {
            row,
            column,
            message,
        },
    }
}
