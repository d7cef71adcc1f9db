//! Account use-case service.
//!
//! # Responsibility
//! - Register accounts and verify credentials.
//! - Own the single active session (login/logout/current user).
//!
//! # Invariants
//! - Failed logins never reveal whether the username exists.
//! - Logging in replaces any previous session.

use crate::model::user::{validate_credentials, User, UserId};
use crate::model::ValidationError;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AccountError {
    InvalidCredentials,
    UsernameTaken(String),
    NotLoggedIn,
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::UsernameTaken(username) => write!(f, "username `{username}` already exists"),
            Self::NotLoggedIn => write!(f, "no user is logged in"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AccountError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Account facade over a user repository.
pub struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account. Does not log the new user in.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let mut user = User::new(username, password)?;
        if self.repo.get_user_by_username(username)?.is_some() {
            return Err(AccountError::UsernameTaken(username.to_string()));
        }

        user.id = match self.repo.create_user(&user) {
            Ok(id) => id,
            Err(RepoError::Conflict(_)) => {
                return Err(AccountError::UsernameTaken(username.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            "event=user_register module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Verifies credentials and makes the user the active session.
    pub fn login(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let user = self.authenticate(username, password)?;
        self.repo.set_active_user(user.id)?;
        info!("event=user_login module=service status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Ends the active session, if any.
    pub fn logout(&self) -> Result<Option<UserId>, AccountError> {
        let active = self.repo.active_user_id()?;
        self.repo.clear_active_user()?;
        if let Some(user_id) = active {
            info!("event=user_logout module=service status=ok user_id={user_id}");
        }
        Ok(active)
    }

    pub fn current_user(&self) -> Result<Option<User>, AccountError> {
        match self.repo.active_user_id()? {
            Some(id) => Ok(self.repo.get_user(id)?),
            None => Ok(None),
        }
    }

    /// Like [`Self::current_user`], but fails with `NotLoggedIn`.
    pub fn require_user(&self) -> Result<User, AccountError> {
        self.current_user()?.ok_or(AccountError::NotLoggedIn)
    }

    pub fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let user = self.authenticate(username, old_password)?;
        let replacement = User::new(&user.username, new_password)?;
        self.repo.update_password_hash(user.id, &replacement.password_hash)?;
        info!(
            "event=user_password_change module=service status=ok user_id={}",
            user.id
        );
        Ok(())
    }

    /// Deletes the account and everything it owns.
    pub fn delete_account(&self, username: &str, password: &str) -> Result<(), AccountError> {
        let user = self.authenticate(username, password)?;
        self.repo.delete_user(user.id)?;
        info!("event=user_delete module=service status=ok user_id={}", user.id);
        Ok(())
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        if validate_credentials(username, password).is_err() {
            warn!("event=user_auth module=service status=rejected reason=malformed");
            return Err(AccountError::InvalidCredentials);
        }
        match self.repo.get_user_by_username(username)? {
            Some(user) if user.check_password(password) => Ok(user),
            _ => {
                warn!("event=user_auth module=service status=rejected reason=mismatch");
                Err(AccountError::InvalidCredentials)
            }
        }
    }
}
