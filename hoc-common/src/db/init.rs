//! Database initialization
//!
//! Opens (creating on first run) the census SQLite file and ensures the two
//! census tables exist:
//! - `original_census`: append-only log of raw submitted rows (audit only)
//! - `cleaned_census`: canonical student records, keyed by the composite
//!   identity (student_id, academic_year_key, major_abbreviation_key)

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// How long a writer waits for the database lock before giving up
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // WAL lets the export path read while an ingest run writes. Both
    // settings are per connection, so they go on the connect options.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the census schema
///
/// A single connection is used so every query sees the same database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create census tables (idempotent - safe to call multiple times)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_original_census_table(pool).await?;
    create_cleaned_census_table(pool).await?;
    Ok(())
}

/// Create the raw row log
///
/// `payload` holds the submitted row as a JSON object of header -> value.
pub async fn create_original_census_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS original_census (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_original_census_batch ON original_census(batch_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the canonical record table
pub async fn create_cleaned_census_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cleaned_census (
            student_id TEXT NOT NULL,
            academic_year_key TEXT NOT NULL,
            major_abbreviation_key TEXT NOT NULL,
            name TEXT,
            admit_year TEXT,
            academic_career TEXT NOT NULL,
            major TEXT,
            writeup TEXT,
            picture_url TEXT,
            notable_achievements TEXT,
            interests_hobbies TEXT,
            linkedin_url TEXT,
            instagram_url TEXT,
            github_url TEXT,
            raw_course_name TEXT,
            raw_masters_course TEXT,
            raw_intake_batch TEXT,
            email TEXT,
            raw_ddp_minor TEXT,
            raw_experience_places TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (student_id, academic_year_key, major_abbreviation_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
