//! Rating record (talk meta) persistence
//!
//! One row per (admin, talk) pair. Every write is a single
//! `INSERT ... ON CONFLICT DO UPDATE` so concurrent requests from the same
//! admin for the same talk collapse onto one row, last write wins.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::RatingRecord;
use crate::{Error, Result};

const META_COLUMNS: &str = "admin_user_id, talk_id, rating, viewed, created_at, updated_at";

fn record_from_row(row: &SqliteRow) -> Result<RatingRecord> {
    Ok(RatingRecord {
        admin_user_id: row.try_get("admin_user_id")?,
        talk_id: row.try_get("talk_id")?,
        rating: row.try_get("rating")?,
        viewed: row.try_get("viewed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Load the record for (admin, talk)
pub async fn find_rating_record(
    pool: &SqlitePool,
    admin_id: i64,
    talk_id: i64,
) -> Result<Option<RatingRecord>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM talk_meta WHERE admin_user_id = ? AND talk_id = ?",
        META_COLUMNS
    ))
    .bind(admin_id)
    .bind(talk_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Insert or overwrite the rating for (admin, talk).
///
/// Callers validate `value` first; this function stores whatever it is given.
pub async fn upsert_rating_record(
    pool: &SqlitePool,
    admin_id: i64,
    talk_id: i64,
    value: i64,
    timestamp: DateTime<Utc>,
) -> Result<RatingRecord> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO talk_meta (admin_user_id, talk_id, rating, viewed, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        ON CONFLICT(admin_user_id, talk_id) DO UPDATE SET
            rating = excluded.rating,
            updated_at = excluded.updated_at
        RETURNING {}
        "#,
        META_COLUMNS
    ))
    .bind(admin_id)
    .bind(talk_id)
    .bind(value)
    .bind(timestamp)
    .bind(timestamp)
    .fetch_one(pool)
    .await
    .map_err(|e| missing_talk(e, talk_id))?;

    record_from_row(&row)
}

// The talk may be deleted between the caller's lookup and the write
fn missing_talk(e: sqlx::Error, talk_id: i64) -> Error {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound(format!("Talk {}", talk_id))
        }
        other => other.into(),
    }
}

/// Flag the talk as viewed by the admin, leaving any rating untouched
pub async fn mark_viewed(
    pool: &SqlitePool,
    admin_id: i64,
    talk_id: i64,
    timestamp: DateTime<Utc>,
) -> Result<RatingRecord> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO talk_meta (admin_user_id, talk_id, rating, viewed, created_at, updated_at)
        VALUES (?, ?, NULL, 1, ?, ?)
        ON CONFLICT(admin_user_id, talk_id) DO UPDATE SET
            viewed = 1,
            updated_at = excluded.updated_at
        RETURNING {}
        "#,
        META_COLUMNS
    ))
    .bind(admin_id)
    .bind(talk_id)
    .bind(timestamp)
    .bind(timestamp)
    .fetch_one(pool)
    .await
    .map_err(|e| missing_talk(e, talk_id))?;

    record_from_row(&row)
}

/// All records for a talk, one per admin who viewed or rated it
pub async fn find_records_for_talk(pool: &SqlitePool, talk_id: i64) -> Result<Vec<RatingRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM talk_meta WHERE talk_id = ? ORDER BY admin_user_id",
        META_COLUMNS
    ))
    .bind(talk_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}
