//! SQLite-backed census store
//!
//! Tables are created by `hoc_common::db::init_schema`. Upserts use the
//! composite primary key with `ON CONFLICT ... DO UPDATE` inside an
//! immediate transaction, so the database serializes concurrent writers to
//! the same identity (last writer wins).

use super::{CensusStore, StoreError, UpsertOutcome};
use crate::census::{AuditFields, CanonicalStudentRecord, PublicProfile, RawRow, StudentKey};
use async_trait::async_trait;
use hoc_common::time;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SqliteCensusStore {
    pool: SqlitePool,
}

impl SqliteCensusStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of rows in the raw log
    pub async fn raw_log_len(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM original_census")
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        Ok(count)
    }
}

/// Split sqlx failures into unavailability, constraint violations and the rest
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        sqlx::Error::Database(ref db_err) if !matches!(db_err.kind(), ErrorKind::Other) => {
            StoreError::Constraint(db_err.message().to_string())
        }
        other => StoreError::Database(other),
    }
}

fn record_from_row(row: &SqliteRow) -> Result<CanonicalStudentRecord, sqlx::Error> {
    Ok(CanonicalStudentRecord {
        key: StudentKey {
            student_id: row.try_get("student_id")?,
            academic_year_key: row.try_get("academic_year_key")?,
            major_abbreviation_key: row.try_get("major_abbreviation_key")?,
        },
        profile: PublicProfile {
            name: row.try_get("name")?,
            admit_year: row.try_get("admit_year")?,
            academic_career: row.try_get("academic_career")?,
            major: row.try_get("major")?,
            writeup: row.try_get("writeup")?,
            picture_url: row.try_get("picture_url")?,
            notable_achievements: row.try_get("notable_achievements")?,
            interests_hobbies: row.try_get("interests_hobbies")?,
            linkedin_url: row.try_get("linkedin_url")?,
            instagram_url: row.try_get("instagram_url")?,
            github_url: row.try_get("github_url")?,
        },
        audit: AuditFields {
            raw_course_name: row.try_get("raw_course_name")?,
            raw_masters_course: row.try_get("raw_masters_course")?,
            raw_intake_batch: row.try_get("raw_intake_batch")?,
            email: row.try_get("email")?,
            raw_ddp_minor: row.try_get("raw_ddp_minor")?,
            raw_experience_places: row.try_get("raw_experience_places")?,
        },
    })
}

#[async_trait]
impl CensusStore for SqliteCensusStore {
    async fn append_raw(&self, batch_id: Uuid, row: &RawRow) -> Result<(), StoreError> {
        let payload = serde_json::to_string(row)?;

        sqlx::query("INSERT INTO original_census (batch_id, payload, uploaded_at) VALUES (?, ?, ?)")
            .bind(batch_id.to_string())
            .bind(payload)
            .bind(time::to_rfc3339(time::now()))
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn upsert(&self, record: &CanonicalStudentRecord) -> Result<UpsertOutcome, StoreError> {
        let key = &record.key;
        let profile = &record.profile;
        let audit = &record.audit;
        let now = time::to_rfc3339(time::now());

        // Take the write lock before the read so concurrent upserts queue on
        // busy_timeout instead of failing a read-to-write lock upgrade.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(classify)?;

        let previous: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT name FROM cleaned_census
            WHERE student_id = ? AND academic_year_key = ? AND major_abbreviation_key = ?
            "#,
        )
        .bind(&key.student_id)
        .bind(&key.academic_year_key)
        .bind(&key.major_abbreviation_key)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify)?;

        sqlx::query(
            r#"
            INSERT INTO cleaned_census (
                student_id, academic_year_key, major_abbreviation_key,
                name, admit_year, academic_career, major, writeup, picture_url,
                notable_achievements, interests_hobbies, linkedin_url, instagram_url, github_url,
                raw_course_name, raw_masters_course, raw_intake_batch, email,
                raw_ddp_minor, raw_experience_places,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(student_id, academic_year_key, major_abbreviation_key) DO UPDATE SET
                name = excluded.name,
                admit_year = excluded.admit_year,
                academic_career = excluded.academic_career,
                major = excluded.major,
                writeup = excluded.writeup,
                picture_url = excluded.picture_url,
                notable_achievements = excluded.notable_achievements,
                interests_hobbies = excluded.interests_hobbies,
                linkedin_url = excluded.linkedin_url,
                instagram_url = excluded.instagram_url,
                github_url = excluded.github_url,
                raw_course_name = excluded.raw_course_name,
                raw_masters_course = excluded.raw_masters_course,
                raw_intake_batch = excluded.raw_intake_batch,
                email = excluded.email,
                raw_ddp_minor = excluded.raw_ddp_minor,
                raw_experience_places = excluded.raw_experience_places,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key.student_id)
        .bind(&key.academic_year_key)
        .bind(&key.major_abbreviation_key)
        .bind(&profile.name)
        .bind(&profile.admit_year)
        .bind(&profile.academic_career)
        .bind(&profile.major)
        .bind(&profile.writeup)
        .bind(&profile.picture_url)
        .bind(&profile.notable_achievements)
        .bind(&profile.interests_hobbies)
        .bind(&profile.linkedin_url)
        .bind(&profile.instagram_url)
        .bind(&profile.github_url)
        .bind(&audit.raw_course_name)
        .bind(&audit.raw_masters_course)
        .bind(&audit.raw_intake_batch)
        .bind(&audit.email)
        .bind(&audit.raw_ddp_minor)
        .bind(&audit.raw_experience_places)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        tx.commit().await.map_err(classify)?;

        Ok(match previous {
            None => UpsertOutcome::Inserted,
            Some(previous_name) => UpsertOutcome::Updated { previous_name },
        })
    }

    async fn fetch_all(&self) -> Result<Vec<CanonicalStudentRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM cleaned_census")
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Database)
    }
}
