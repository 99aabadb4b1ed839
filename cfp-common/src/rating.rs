//! Talk rating strategies
//!
//! Every scheme shares the same write path: validate, then upsert the
//! (admin, talk) record. Schemes differ only in which values they accept
//! and in the name presentation layers use to pick a rating widget, so the
//! scheme is a closed enum and [`TalkRating::rate`] is the single place
//! that touches storage.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::models::RatingRecord;
use crate::db::ratings;
use crate::{Error, Result};

/// Name of the scheme used when configuration names nothing we know
pub const DEFAULT_RATING_SYSTEM: &str = "yesno";

/// Scoring scheme applied during talk review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingScheme {
    /// Binary vote: 0 (no) or 1 (yes)
    #[default]
    YesNo,
    /// Integer score from 1 to 10 inclusive
    OneToTen,
}

impl RatingScheme {
    /// Resolve a configured scheme name (case-insensitive).
    ///
    /// Unknown names, including the empty string, fall back to
    /// [`RatingScheme::YesNo`] so a misconfiguration never blocks rating.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "yesno" => RatingScheme::YesNo,
            "onetoten" => RatingScheme::OneToTen,
            other => {
                warn!(
                    "Unknown rating system '{}', falling back to '{}'",
                    other, DEFAULT_RATING_SYSTEM
                );
                RatingScheme::YesNo
            }
        }
    }

    /// Resolve a raw configuration value. Anything that isn't a string
    /// (integers, booleans, tables) falls back to [`RatingScheme::YesNo`].
    pub fn from_config_value(value: &toml::Value) -> Self {
        match value.as_str() {
            Some(name) => Self::from_name(name),
            None => {
                warn!(
                    "Non-string rating system {:?}, falling back to '{}'",
                    value, DEFAULT_RATING_SYSTEM
                );
                RatingScheme::YesNo
            }
        }
    }

    pub fn is_valid_rating(&self, value: i64) -> bool {
        match self {
            RatingScheme::YesNo => value == 0 || value == 1,
            RatingScheme::OneToTen => (1..=10).contains(&value),
        }
    }

    /// Stable identifier used by presentation layers
    pub fn rating_name(&self) -> &'static str {
        match self {
            RatingScheme::YesNo => "yesno",
            RatingScheme::OneToTen => "onetoten",
        }
    }
}

/// A rating scheme bound to the acting admin
#[derive(Debug, Clone)]
pub struct TalkRating {
    scheme: RatingScheme,
    admin_id: i64,
    pool: SqlitePool,
}

/// Materialize the configured strategy for one admin
pub fn select(name: &str, admin_id: i64, pool: SqlitePool) -> TalkRating {
    TalkRating::new(RatingScheme::from_name(name), admin_id, pool)
}

impl TalkRating {
    pub fn new(scheme: RatingScheme, admin_id: i64, pool: SqlitePool) -> Self {
        Self {
            scheme,
            admin_id,
            pool,
        }
    }

    pub fn scheme(&self) -> RatingScheme {
        self.scheme
    }

    pub fn is_valid_rating(&self, value: i64) -> bool {
        self.scheme.is_valid_rating(value)
    }

    pub fn rating_name(&self) -> &'static str {
        self.scheme.rating_name()
    }

    /// Record this admin's rating for a talk.
    ///
    /// Invalid values return [`Error::RatingValidation`] before anything is
    /// written. Valid values overwrite any earlier rating by the same admin.
    pub async fn rate(&self, talk_id: i64, value: i64) -> Result<RatingRecord> {
        if !self.is_valid_rating(value) {
            return Err(Error::RatingValidation {
                value,
                scheme: self.rating_name(),
            });
        }

        let record =
            ratings::upsert_rating_record(&self.pool, self.admin_id, talk_id, value, Utc::now())
                .await?;

        info!(
            "Admin {} rated talk {} with {} ({})",
            self.admin_id,
            talk_id,
            value,
            self.rating_name()
        );

        Ok(record)
    }

    /// This admin's current record for a talk, if any
    pub async fn find_rating(&self, talk_id: i64) -> Result<Option<RatingRecord>> {
        ratings::find_rating_record(&self.pool, self.admin_id, talk_id).await
    }
}
