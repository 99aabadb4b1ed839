//! Talk persistence
//!
//! Ownership is part of every speaker-facing query: updates and deletes
//! match on both the talk id and the owner id, and nothing ever rewrites
//! `user_id` after insert.

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::{Talk, TalkSubmission};
use crate::Result;

pub(crate) const TALK_COLUMNS: &str = "talks.id, talks.user_id, talks.title, talks.description, \
     talks.type, talks.level, talks.category, talks.desired, talks.slides, talks.other, \
     talks.sponsor, talks.selected, talks.favorite, talks.created_at, talks.updated_at";

pub(crate) fn talk_from_row(row: &SqliteRow) -> Result<Talk> {
    Ok(Talk {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        talk_type: row.try_get("type")?,
        level: row.try_get("level")?,
        category: row.try_get("category")?,
        desired: row.try_get("desired")?,
        slides: row.try_get("slides")?,
        other: row.try_get("other")?,
        sponsor: row.try_get("sponsor")?,
        selected: row.try_get("selected")?,
        favorite: row.try_get("favorite")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a talk owned by `owner_id`, returning the stored row
pub async fn create_talk(
    pool: &SqlitePool,
    owner_id: i64,
    submission: &TalkSubmission,
) -> Result<Talk> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO talks (
            user_id, title, description, type, level, category,
            desired, slides, other, sponsor, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(owner_id)
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(&submission.talk_type)
    .bind(&submission.level)
    .bind(&submission.category)
    .bind(submission.desired)
    .bind(&submission.slides)
    .bind(&submission.other)
    .bind(submission.sponsor)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    find_talk_by_id(pool, id)
        .await?
        .ok_or_else(|| crate::Error::Internal(format!("Talk {} vanished after insert", id)))
}

/// Load talk by id, regardless of owner
pub async fn find_talk_by_id(pool: &SqlitePool, talk_id: i64) -> Result<Option<Talk>> {
    let row = sqlx::query(&format!("SELECT {} FROM talks WHERE talks.id = ?", TALK_COLUMNS))
        .bind(talk_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(talk_from_row).transpose()
}

/// Load talk through the owner relation; `None` when it belongs to someone else
pub async fn find_talk_for_owner(
    pool: &SqlitePool,
    owner_id: i64,
    talk_id: i64,
) -> Result<Option<Talk>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM talks WHERE talks.user_id = ? AND talks.id = ?",
        TALK_COLUMNS
    ))
    .bind(owner_id)
    .bind(talk_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(talk_from_row).transpose()
}

/// All talks of one speaker, ordered by title
pub async fn find_talks_by_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Talk>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM talks WHERE talks.user_id = ? ORDER BY talks.title ASC, talks.id ASC",
        TALK_COLUMNS
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(talk_from_row).collect()
}

/// Replace talk content. Returns false when no talk matched (id, owner).
pub async fn update_talk(
    pool: &SqlitePool,
    owner_id: i64,
    talk_id: i64,
    submission: &TalkSubmission,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE talks SET
            title = ?, description = ?, type = ?, level = ?, category = ?,
            desired = ?, slides = ?, other = ?, sponsor = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(&submission.talk_type)
    .bind(&submission.level)
    .bind(&submission.category)
    .bind(submission.desired)
    .bind(&submission.slides)
    .bind(&submission.other)
    .bind(submission.sponsor)
    .bind(Utc::now())
    .bind(talk_id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Delete a talk owned by `owner_id`. Ratings and comments cascade.
pub async fn delete_talk(pool: &SqlitePool, owner_id: i64, talk_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM talks WHERE id = ? AND user_id = ?")
        .bind(talk_id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Set the admin-only "selected" flag. Returns false when the talk doesn't exist.
pub async fn set_selected(pool: &SqlitePool, talk_id: i64, selected: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE talks SET selected = ?, updated_at = ? WHERE id = ?")
        .bind(selected)
        .bind(Utc::now())
        .bind(talk_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Set the "favorite" flag. Returns false when the talk doesn't exist.
pub async fn set_favorite(pool: &SqlitePool, talk_id: i64, favorite: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE talks SET favorite = ?, updated_at = ? WHERE id = ?")
        .bind(favorite)
        .bind(Utc::now())
        .bind(talk_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::open_in_memory;
    use crate::db::users::{create_user, NewUser};

    fn submission(title: &str) -> TalkSubmission {
        TalkSubmission {
            title: title.to_string(),
            description: "A talk".to_string(),
            talk_type: "regular".to_string(),
            level: "mid".to_string(),
            category: "testing".to_string(),
            ..Default::default()
        }
    }

    async fn speaker(pool: &SqlitePool, email: &str) -> i64 {
        create_user(pool, &NewUser::speaker(email, "secret123", "Sam", "Speaker"))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_find_talk() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "sam@example.com").await;

        let talk = create_talk(&pool, owner, &submission("Zero-cost futures")).await.unwrap();
        assert_eq!(talk.user_id, owner);
        assert!(!talk.selected);

        let found = find_talk_by_id(&pool, talk.id).await.unwrap().unwrap();
        assert_eq!(found, talk);
    }

    #[tokio::test]
    async fn test_owner_relation_hides_foreign_talks() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "owner@example.com").await;
        let other = speaker(&pool, "other@example.com").await;
        let talk = create_talk(&pool, owner, &submission("Mine")).await.unwrap();

        assert!(find_talk_for_owner(&pool, owner, talk.id).await.unwrap().is_some());
        assert!(find_talk_for_owner(&pool, other, talk.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_talks_by_owner_ordered_by_title() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "owner@example.com").await;
        create_talk(&pool, owner, &submission("Borrowing")).await.unwrap();
        create_talk(&pool, owner, &submission("Async")).await.unwrap();

        let titles: Vec<String> = find_talks_by_owner(&pool, owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Async", "Borrowing"]);
    }

    #[tokio::test]
    async fn test_update_requires_owner_and_keeps_owner() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "owner@example.com").await;
        let other = speaker(&pool, "other@example.com").await;
        let talk = create_talk(&pool, owner, &submission("Draft")).await.unwrap();

        assert!(!update_talk(&pool, other, talk.id, &submission("Hijacked")).await.unwrap());
        assert!(update_talk(&pool, owner, talk.id, &submission("Final")).await.unwrap());

        let stored = find_talk_by_id(&pool, talk.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Final");
        assert_eq!(stored.user_id, owner);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "owner@example.com").await;
        let other = speaker(&pool, "other@example.com").await;
        let talk = create_talk(&pool, owner, &submission("Short-lived")).await.unwrap();

        assert!(!delete_talk(&pool, other, talk.id).await.unwrap());
        assert!(delete_talk(&pool, owner, talk.id).await.unwrap());
        assert!(find_talk_by_id(&pool, talk.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flags() {
        let pool = open_in_memory().await.unwrap();
        let owner = speaker(&pool, "owner@example.com").await;
        let talk = create_talk(&pool, owner, &submission("Flagged")).await.unwrap();

        assert!(set_selected(&pool, talk.id, true).await.unwrap());
        assert!(set_favorite(&pool, talk.id, true).await.unwrap());
        assert!(!set_favorite(&pool, 9999, true).await.unwrap());

        let stored = find_talk_by_id(&pool, talk.id).await.unwrap().unwrap();
        assert!(stored.selected);
        assert!(stored.favorite);
    }
}
