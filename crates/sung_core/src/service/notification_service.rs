//! Due-date reminders.
//!
//! A task is reported when it is not completed, has a due date, and that date
//! is at most `notification_interval_days` away. Overdue tasks are reported too.

use crate::model::task::{Task, TaskId};
use crate::model::user::UserId;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub task_id: TaskId,
    pub title: String,
    pub due_date: NaiveDate,
    /// Negative when overdue.
    pub days_until_due: i64,
}

impl Notification {
    pub fn is_overdue(&self) -> bool {
        self.days_until_due < 0
    }
}

/// Filters `tasks` down to reminders, ordered by due date then id.
pub fn tasks_due_within(tasks: &[Task], interval_days: i64, today: NaiveDate) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = tasks
        .iter()
        .filter(|task| !task.is_completed())
        .filter_map(|task| {
            let due_date = task.due_date?;
            let days_until_due = (due_date - today).num_days();
            (days_until_due <= interval_days).then(|| Notification {
                task_id: task.id,
                title: task.title.clone(),
                due_date,
                days_until_due,
            })
        })
        .collect();
    notifications.sort_by_key(|notification| (notification.due_date, notification.task_id));
    notifications
}

pub struct NotificationService<T: TaskRepository, S: SettingsRepository> {
    tasks: T,
    settings: S,
}

impl<T: TaskRepository, S: SettingsRepository> NotificationService<T, S> {
    pub fn new(tasks: T, settings: S) -> Self {
        Self { tasks, settings }
    }

    /// Reminders for `user_id`; empty when notifications are disabled.
    pub fn due_notifications(&self, user_id: UserId, today: NaiveDate) -> RepoResult<Vec<Notification>> {
        let settings = self.settings.get_settings(user_id)?;
        if !settings.notifications_enabled {
            debug!("event=notify module=service status=skipped user_id={user_id} reason=disabled");
            return Ok(Vec::new());
        }

        let tasks = self.tasks.list_tasks(user_id, &TaskListQuery::default())?;
        let notifications = tasks_due_within(&tasks, settings.notification_interval_days, today);
        debug!(
            "event=notify module=service status=ok user_id={} count={}",
            user_id,
            notifications.len()
        );
        Ok(notifications)
    }
}
