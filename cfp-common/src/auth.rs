//! Password hashing and session token generation
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`); the salt and cost
//! parameters travel inside the string. Session tokens are random v4
//! UUIDs in simple (hyphen-less) form.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 5;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string.
///
/// A stored value that doesn't parse never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unreadable stored password hash: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate an opaque session token
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
