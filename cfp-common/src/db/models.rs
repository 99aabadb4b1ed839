//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Role held by a user. Roles are additive: an admin is not implicitly a reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Speaker,
    Reviewer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Speaker => "speaker",
            Role::Reviewer => "reviewer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "speaker" => Ok(Role::Speaker),
            "reviewer" => Ok(Role::Reviewer),
            "admin" => Ok(Role::Admin),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Authenticated actor performing a request.
///
/// Resolved once per request by the HTTP layer and passed explicitly to
/// every operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i64,
    pub login: String,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// User profile (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub twitter: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Talk submitted by a speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: i64,
    /// Owning speaker. Set on insert, never updated.
    pub user_id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub talk_type: String,
    pub level: String,
    pub category: String,
    pub desired: bool,
    pub slides: Option<String>,
    pub other: Option<String>,
    pub sponsor: bool,
    pub selected: bool,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Talk content as submitted or edited by its speaker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TalkSubmission {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub talk_type: String,
    pub level: String,
    pub category: String,
    #[serde(default)]
    pub desired: bool,
    #[serde(default)]
    pub slides: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
    #[serde(default)]
    pub sponsor: bool,
}

pub const MAX_TITLE_LEN: usize = 100;

impl TalkSubmission {
    /// Trim text fields and check required ones
    pub fn sanitized(mut self) -> Result<Self> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.talk_type = self.talk_type.trim().to_string();
        self.level = self.level.trim().to_string();
        self.category = self.category.trim().to_string();
        self.slides = self.slides.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.other = self.other.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        if self.title.is_empty() {
            return Err(Error::InvalidInput("Title is required".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::InvalidInput(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if self.description.is_empty() {
            return Err(Error::InvalidInput("Description is required".to_string()));
        }
        for (field, value) in [
            ("type", &self.talk_type),
            ("level", &self.level),
            ("category", &self.category),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidInput(format!("Talk {} is required", field)));
            }
        }

        Ok(self)
    }
}

/// Per-admin, per-talk review metadata.
///
/// Unique on (admin_user_id, talk_id). `rating` stays `None` when the
/// admin has only viewed the talk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub admin_user_id: i64,
    pub talk_id: i64,
    pub rating: Option<i64>,
    pub viewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkComment {
    pub id: i64,
    pub talk_id: i64,
    pub user_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
