//! HTTP API handlers for the census admin surface

pub mod census;
pub mod error;
pub mod health;

pub use census::{add_profile, get_directory, upload_census};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
