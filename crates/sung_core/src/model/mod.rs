//! Domain model for tasks, accounts and preferences.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every write path validates through these types before SQL mutations.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod archive;
pub mod priority;
pub mod settings;
pub mod task;
pub mod user;

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    InvalidPriority(String),
    InvalidStatus(String),
    InvalidDate(String),
    /// `completed_date` must be present exactly when status is Completed.
    CompletionMismatch,
    InvalidUsername(String),
    PasswordTooShort { min_len: usize },
    NegativeDays { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::InvalidPriority(value) => {
                write!(f, "invalid priority `{value}`; expected High or Low")
            }
            Self::InvalidStatus(value) => write!(
                f,
                "invalid status `{value}`; expected Open, In Progress or Completed"
            ),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; use YYYY-MM-DD")
            }
            Self::CompletionMismatch => write!(
                f,
                "completed date must be set if and only if the task is completed"
            ),
            Self::InvalidUsername(value) => write!(
                f,
                "invalid username `{value}`; use 3-32 letters, digits or underscores"
            ),
            Self::PasswordTooShort { min_len } => {
                write!(f, "password must be at least {min_len} characters")
            }
            Self::NegativeDays { field, value } => {
                write!(f, "{field} must be zero or positive, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Parses a `YYYY-MM-DD` date as used in storage and on the command line.
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate, ValidationError> {
    chrono::NaiveDate::parse_from_str(value.trim(), task::DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}
