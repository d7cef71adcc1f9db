//! Core domain logic for the Sung task manager.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod diagram;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::archive::{ArchivedTask, ArchivedTaskId};
pub use model::priority::{Priority, PriorityFlags, SungRegion};
pub use model::settings::Settings;
pub use model::task::{Task, TaskDraft, TaskEdit, TaskId, TaskStatus};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::archive_repo::{ArchiveRepository, SqliteArchiveRepository};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountError, AccountService};
pub use service::archive_service::{ArchiveError, ArchiveService, MaintenanceReport};
pub use service::notification_service::{Notification, NotificationService};
pub use service::settings_service::{SettingsError, SettingsService};
pub use service::task_service::{TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
