//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds since the Unix epoch for the current instant
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 3339 rendering used for `uploaded_at` / `updated_at` columns
pub fn to_rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
