//! User, role and credential persistence

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeSet;
use tracing::info;

use super::models::{Identity, Role, User};
use crate::auth::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::pagination::{calculate_pagination, sanitize_per_page};
use crate::{Error, Result};

const USER_COLUMNS: &str =
    "users.id, users.email, users.first_name, users.last_name, users.company, users.twitter, users.bio, users.created_at";

/// Account data submitted at signup
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl NewUser {
    pub fn speaker(email: &str, password: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            company: None,
            twitter: None,
            bio: None,
        }
    }

    fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::InvalidInput("A valid email address is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(Error::InvalidInput("First and last name are required".to_string()));
        }
        Ok(())
    }
}

/// User together with the roles they hold
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: BTreeSet<Role>,
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        company: row.try_get("company")?,
        twitter: row.try_get("twitter")?,
        bio: row.try_get("bio")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create a user holding the speaker role.
///
/// Returns `Error::Conflict` when the email is already registered.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    new_user.validate()?;

    let hash = hash_password(&new_user.password)?;

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (
            email, password_hash, first_name, last_name,
            company, twitter, bio, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_user.email.trim())
    .bind(&hash)
    .bind(new_user.first_name.trim())
    .bind(new_user.last_name.trim())
    .bind(&new_user.company)
    .bind(&new_user.twitter)
    .bind(&new_user.bio)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await;

    let user_id = match inserted {
        Ok(result) => result.last_insert_rowid(),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(Error::Conflict(format!(
                "An account already exists for {}",
                new_user.email.trim()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?, ?)")
        .bind(user_id)
        .bind(Role::Speaker.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("Created account {} for {}", user_id, new_user.email.trim());

    find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("User {} vanished after insert", user_id)))
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE users.id = ?", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Roles held by a user (empty when the user doesn't exist)
pub async fn find_roles(pool: &SqlitePool, user_id: i64) -> Result<BTreeSet<Role>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT role FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(|(role,)| role.parse::<Role>()).collect()
}

/// Build the identity for a user id
pub async fn load_identity(pool: &SqlitePool, user_id: i64) -> Result<Option<Identity>> {
    let login: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match login {
        Some((login,)) => Ok(Some(Identity {
            id: user_id,
            login,
            roles: find_roles(pool, user_id).await?,
        })),
        None => Ok(None),
    }
}

/// Check credentials; `None` for unknown email or wrong password alike
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<Identity>> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id, hash)) if verify_password(password, &hash) => {
            load_identity(pool, id).await
        }
        _ => Ok(None),
    }
}

/// Grant a role. Returns false when the user already held it.
pub async fn add_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Revoke a role. Returns false when the user didn't hold it.
pub async fn remove_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<bool> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role = ?")
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Speaker index query: free-text search, role filter and paging
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearch {
    /// Matched against first name, last name, full name and email
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One page of the speaker index
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserWithRoles>,
    pub total_records: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const SEARCH_CONDITION: &str = "(users.first_name LIKE ? ESCAPE '\\'
     OR users.last_name LIKE ? ESCAPE '\\'
     OR (users.first_name || ' ' || users.last_name) LIKE ? ESCAPE '\\'
     OR users.email LIKE ? ESCAPE '\\')";

const ROLE_CONDITION: &str =
    "EXISTS (SELECT 1 FROM user_roles WHERE user_roles.user_id = users.id AND user_roles.role = ?)";

/// Users with their role sets, ordered by last then first name
pub async fn search_users(pool: &SqlitePool, query: &UserSearch) -> Result<UserPage> {
    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(like_pattern);

    let mut conditions = Vec::new();
    if pattern.is_some() {
        conditions.push(SEARCH_CONDITION);
    }
    if query.role.is_some() {
        conditions.push(ROLE_CONDITION);
    }
    let where_clause = if conditions.is_empty() {
        "1 = 1".to_string()
    } else {
        conditions.join(" AND ")
    };

    let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pattern) = &pattern {
        for _ in 0..4 {
            count_query = count_query.bind(pattern);
        }
    }
    if let Some(role) = query.role {
        count_query = count_query.bind(role.as_str());
    }
    let total_records = count_query.fetch_one(pool).await?;

    let p = calculate_pagination(
        total_records,
        query.page.unwrap_or(1),
        sanitize_per_page(query.per_page),
    );

    let list_sql = format!(
        "SELECT {} FROM users WHERE {}
         ORDER BY users.last_name COLLATE NOCASE, users.first_name COLLATE NOCASE, users.id
         LIMIT ? OFFSET ?",
        USER_COLUMNS, where_clause
    );
    let mut list_query = sqlx::query(&list_sql);
    if let Some(pattern) = &pattern {
        for _ in 0..4 {
            list_query = list_query.bind(pattern);
        }
    }
    if let Some(role) = query.role {
        list_query = list_query.bind(role.as_str());
    }
    let rows = list_query
        .bind(p.per_page)
        .bind(p.offset)
        .fetch_all(pool)
        .await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in &rows {
        let user = user_from_row(row)?;
        let roles = find_roles(pool, user.id).await?;
        users.push(UserWithRoles { user, roles });
    }

    Ok(UserPage {
        users,
        total_records,
        page: p.page,
        per_page: p.per_page,
        total_pages: p.total_pages,
    })
}

/// Delete a user. Talks, ratings, comments and sessions cascade.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
