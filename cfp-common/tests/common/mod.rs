//! Shared fixtures for cfp-common integration tests

#![allow(dead_code)]

use cfp_common::db::models::{Identity, TalkSubmission};
use cfp_common::db::users::{self, NewUser};
use cfp_common::db::{open_in_memory, talks};
use cfp_common::Role;
use sqlx::SqlitePool;

pub async fn pool() -> SqlitePool {
    open_in_memory().await.expect("Should open in-memory database")
}

/// Create a user holding `roles` on top of speaker
pub async fn user(pool: &SqlitePool, email: &str, roles: &[Role]) -> Identity {
    let user = users::create_user(pool, &NewUser::speaker(email, "secret", "Test", "User"))
        .await
        .expect("Should create user");
    for role in roles {
        users::add_role(pool, user.id, *role).await.expect("Should add role");
    }
    users::load_identity(pool, user.id)
        .await
        .expect("Should load identity")
        .expect("Identity should exist")
}

pub fn submission(title: &str, category: &str) -> TalkSubmission {
    TalkSubmission {
        title: title.to_string(),
        description: "Description".to_string(),
        talk_type: "regular".to_string(),
        level: "beginner".to_string(),
        category: category.to_string(),
        ..Default::default()
    }
}

pub async fn talk(pool: &SqlitePool, owner: &Identity, title: &str, category: &str) -> i64 {
    talks::create_talk(pool, owner.id, &submission(title, category))
        .await
        .expect("Should create talk")
        .id
}
