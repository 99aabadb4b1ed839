//! Common error types for the CFP service
//!
//! Domain errors (rating validation, authorization, closed submission
//! window) are expected to be caught by the HTTP layer and turned into
//! user-facing messages. Infrastructure errors propagate untouched.

use thiserror::Error;

/// Common result type for CFP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the CFP crates
#[derive(Error, Debug)]
pub enum Error {
    /// Rating value outside the active scheme's accepted domain
    #[error("Invalid rating {value} for rating system '{scheme}'")]
    RatingValidation { value: i64, scheme: &'static str },

    /// Identity may not act on the requested resource.
    ///
    /// Deliberately carries no detail: a missing talk and a talk owned by
    /// somebody else produce the same error.
    #[error("Not authorized")]
    NotAuthorized,

    /// Call for proposals is not open
    #[error("The call for proposals is closed")]
    SubmissionClosed,

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request conflicts with current state (duplicate email, role already held)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
