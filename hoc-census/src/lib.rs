//! hoc-census library - census normalization pipeline and admin API
//!
//! Turns a census spreadsheet (or a single submitted profile) into the
//! nested academic-year / major / student directory consumed by the
//! "Humans of" profile pages.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod census;
pub mod error;
pub mod store;

pub use census::{CensusPipeline, IngestReport, OutputDirectory};
pub use error::{CensusError, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CensusPipeline>,
}

impl AppState {
    pub fn new(pipeline: CensusPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let census = Router::new()
        .route("/api/census", post(api::upload_census))
        .route("/api/profile", post(api::add_profile))
        .route("/api/directory", get(api::get_directory));

    Router::new()
        .merge(census)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
