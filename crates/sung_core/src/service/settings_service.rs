//! Settings use-case service.

use crate::model::priority::PriorityFlags;
use crate::model::settings::Settings;
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SettingsError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SettingsError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for SettingsError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct SettingsService<S: SettingsRepository> {
    repo: S,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    pub fn get(&self, user_id: UserId) -> Result<Settings, SettingsError> {
        Ok(self.repo.get_settings(user_id)?)
    }

    pub fn save(&self, user_id: UserId, settings: &Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.repo.save_settings(user_id, settings)?;
        info!("event=settings_save module=service status=ok user_id={user_id}");
        Ok(())
    }

    /// Reads, modifies and writes back the user's settings.
    pub fn update<F>(&self, user_id: UserId, change: F) -> Result<Settings, SettingsError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.get(user_id)?;
        change(&mut settings);
        self.save(user_id, &settings)?;
        Ok(settings)
    }

    pub fn update_default_priorities(
        &self,
        user_id: UserId,
        priorities: PriorityFlags,
    ) -> Result<Settings, SettingsError> {
        self.update(user_id, |settings| settings.default_priorities = priorities)
    }

    pub fn set_notifications_enabled(
        &self,
        user_id: UserId,
        enabled: bool,
    ) -> Result<Settings, SettingsError> {
        self.update(user_id, |settings| settings.notifications_enabled = enabled)
    }

    pub fn set_notification_interval(
        &self,
        user_id: UserId,
        days: i64,
    ) -> Result<Settings, SettingsError> {
        self.update(user_id, |settings| settings.notification_interval_days = days)
    }
}
