//! Account model and credential helpers.
//!
//! # Invariants
//! - Passwords are never stored; only the hex SHA-256 digest is kept.
//! - Usernames match `^[A-Za-z0-9_]{3,32}$`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::ValidationError;

pub type UserId = i64;

pub const MIN_PASSWORD_LEN: usize = 6;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("valid username regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    /// Builds an unsaved user (`id == 0`) from validated credentials.
    pub fn new(username: &str, password: &str) -> Result<Self, ValidationError> {
        validate_credentials(username, password)?;
        Ok(Self {
            id: 0,
            username: username.to_string(),
            password_hash: hash_password(password),
        })
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }
}

/// Lowercase hex SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername(username.to_string()))
    }
}

pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    validate_username(username)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min_len: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}
