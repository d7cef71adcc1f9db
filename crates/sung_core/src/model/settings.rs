//! Per-user preferences.

use serde::{Deserialize, Serialize};

use super::priority::PriorityFlags;
use super::ValidationError;

/// Preferences that drive defaults, notifications and archive maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Tasks due within this many days (or overdue) are reported.
    pub notification_interval_days: i64,
    pub notifications_enabled: bool,
    /// Move completed tasks to the archive during maintenance.
    pub auto_archive: bool,
    /// Minimum age of a completion before it is auto-archived.
    pub archive_after_days: i64,
    /// Purge archived tasks during maintenance.
    pub auto_delete: bool,
    /// Minimum time spent in the archive before a purge.
    pub delete_after_days: i64,
    /// Applied to new tasks that do not specify priorities.
    pub default_priorities: PriorityFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_interval_days: 1,
            notifications_enabled: true,
            auto_archive: true,
            archive_after_days: 0,
            auto_delete: false,
            delete_after_days: 30,
            default_priorities: PriorityFlags::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("notification_interval_days", self.notification_interval_days),
            ("archive_after_days", self.archive_after_days),
            ("delete_after_days", self.delete_after_days),
        ] {
            if value < 0 {
                return Err(ValidationError::NegativeDays { field, value });
            }
        }
        Ok(())
    }
}
