//! # Humans-of-Scholars Common Library
//!
//! Shared code for the census tooling:
//! - Error and result types
//! - Configuration loading and root folder resolution
//! - Database initialization and census table schema
//! - Timestamp helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
