//! Login sessions (bearer tokens)

use chrono::Utc;
use sqlx::SqlitePool;

use super::models::Identity;
use super::users::load_identity;
use crate::auth::generate_token;
use crate::Result;

/// Issue a new session token for a user
pub async fn create_session(pool: &SqlitePool, user_id: i64) -> Result<String> {
    let token = generate_token();

    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a token to the identity it was issued for
pub async fn find_session_identity(pool: &SqlitePool, token: &str) -> Result<Option<Identity>> {
    let user_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    match user_id {
        Some(user_id) => load_identity(pool, user_id).await,
        None => Ok(None),
    }
}

/// Invalidate a token. Returns false when it was unknown.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
