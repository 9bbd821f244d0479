//! Database initialization and census table schema

pub mod init;

pub use init::*;
