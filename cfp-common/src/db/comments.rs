//! Review comments on talks

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::TalkComment;
use crate::{Error, Result};

fn comment_from_row(row: &SqliteRow) -> Result<TalkComment> {
    Ok(TalkComment {
        id: row.try_get("id")?,
        talk_id: row.try_get("talk_id")?,
        user_id: row.try_get("user_id")?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Add a comment from `user_id` on a talk
pub async fn add_comment(
    pool: &SqlitePool,
    talk_id: i64,
    user_id: i64,
    message: &str,
) -> Result<TalkComment> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::InvalidInput("Comment cannot be empty".to_string()));
    }

    let row = sqlx::query(
        r#"
        INSERT INTO talk_comments (talk_id, user_id, message, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, talk_id, user_id, message, created_at
        "#,
    )
    .bind(talk_id)
    .bind(user_id)
    .bind(message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    comment_from_row(&row)
}

/// Comments on a talk, oldest first
pub async fn find_comments_for_talk(pool: &SqlitePool, talk_id: i64) -> Result<Vec<TalkComment>> {
    let rows = sqlx::query(
        "SELECT id, talk_id, user_id, message, created_at
         FROM talk_comments WHERE talk_id = ? ORDER BY created_at, id",
    )
    .bind(talk_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(comment_from_row).collect()
}
