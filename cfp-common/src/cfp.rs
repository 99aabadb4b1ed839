//! Call-for-proposals window
//!
//! Pure function of the configured interval and the clock; nothing is stored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{Error, Result};

/// Interval during which speakers may create and edit talks.
///
/// Open while `start <= now < end`. A missing start means the window has
/// been open since the beginning of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CallForProposals {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    pub end: DateTime<Utc>,
}

impl CallForProposals {
    pub fn new(start: Option<DateTime<Utc>>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.start.map_or(true, |start| start <= now);
        started && now < self.end
    }

    pub fn is_open(&self) -> bool {
        self.is_open_at(Utc::now())
    }

    pub fn ensure_open_at(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_open_at(now) {
            Ok(())
        } else {
            Err(Error::SubmissionClosed)
        }
    }

    /// Check before creating or mutating talk content
    pub fn ensure_open(&self) -> Result<()> {
        self.ensure_open_at(Utc::now())
    }
}
