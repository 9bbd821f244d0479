//! API error type and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::CensusError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pipeline failure; status depends on the kind
    #[error(transparent)]
    Census(#[from] CensusError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Census(CensusError::Parse { .. }) => (StatusCode::BAD_REQUEST, "PARSE_ERROR"),
            ApiError::Census(CensusError::Persistence { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            ApiError::Census(CensusError::Fetch(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "FETCH_ERROR")
            }
            ApiError::Census(CensusError::Io(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
