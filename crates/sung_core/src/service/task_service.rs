//! Task use-case service.
//!
//! # Responsibility
//! - Create tasks with the owner's default priorities.
//! - Apply edits and status transitions (start, complete, reopen).
//! - Serve filtered listings and region groupings for the diagram.
//!
//! # Invariants
//! - Every call is scoped to one `UserId`.
//! - Only completed tasks can be reopened; only open tasks can be started.

use crate::diagram::RegionGroups;
use crate::model::task::{Task, TaskDraft, TaskEdit, TaskId, TaskStatus};
use crate::model::user::UserId;
use crate::model::ValidationError;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TaskServiceError {
    NotFound(TaskId),
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        action: &'static str,
    },
    NothingToUpdate,
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidTransition { id, from, action } => {
                write!(f, "cannot {action} task {id}: status is {from}")
            }
            Self::NothingToUpdate => write!(f, "no fields to update"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "task", id } => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for TaskServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Task facade over task and settings repositories.
pub struct TaskService<T: TaskRepository, S: SettingsRepository> {
    tasks: T,
    settings: S,
}

impl<T: TaskRepository, S: SettingsRepository> TaskService<T, S> {
    pub fn new(tasks: T, settings: S) -> Self {
        Self { tasks, settings }
    }

    /// Creates an open task. Missing priorities come from the user's settings.
    pub fn add_task(&self, user_id: UserId, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let priorities = match draft.priorities {
            Some(priorities) => priorities,
            None => self.settings.get_settings(user_id)?.default_priorities,
        };

        let mut task = Task::from_draft(user_id, draft, priorities);
        task.validate()?;
        task.id = self.tasks.create_task(&task)?;

        info!(
            "event=task_create module=service status=ok user_id={} task_id={} region={}",
            user_id,
            task.id,
            task.region().code()
        );
        Ok(task)
    }

    pub fn get_task(&self, user_id: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        self.tasks
            .get_task(user_id, id)?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Applies a partial edit and returns the stored result.
    pub fn edit_task(
        &self,
        user_id: UserId,
        id: TaskId,
        edit: TaskEdit,
    ) -> Result<Task, TaskServiceError> {
        if edit.is_empty() {
            return Err(TaskServiceError::NothingToUpdate);
        }
        let mut task = self.get_task(user_id, id)?;
        task.apply_edit(edit);
        self.save(&task, "edit")?;
        Ok(task)
    }

    pub fn start_task(&self, user_id: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(user_id, id)?;
        if !task.start() {
            return Err(TaskServiceError::InvalidTransition {
                id,
                from: task.status,
                action: "start",
            });
        }
        self.save(&task, "start")?;
        Ok(task)
    }

    /// Marks a task completed as of `today`.
    pub fn complete_task(
        &self,
        user_id: UserId,
        id: TaskId,
        today: NaiveDate,
    ) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(user_id, id)?;
        if task.is_completed() {
            return Err(TaskServiceError::InvalidTransition {
                id,
                from: task.status,
                action: "complete",
            });
        }
        task.mark_completed(today);
        self.save(&task, "complete")?;
        Ok(task)
    }

    pub fn reopen_task(&self, user_id: UserId, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.get_task(user_id, id)?;
        if !task.reopen() {
            return Err(TaskServiceError::InvalidTransition {
                id,
                from: task.status,
                action: "reopen",
            });
        }
        self.save(&task, "reopen")?;
        Ok(task)
    }

    pub fn delete_task(&self, user_id: UserId, id: TaskId) -> Result<(), TaskServiceError> {
        self.tasks.delete_task(user_id, id)?;
        info!("event=task_delete module=service status=ok user_id={user_id} task_id={id}");
        Ok(())
    }

    pub fn list_tasks(
        &self,
        user_id: UserId,
        query: &TaskListQuery,
    ) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.tasks.list_tasks(user_id, query)?)
    }

    /// Matching tasks grouped by diagram region.
    pub fn group_by_region(
        &self,
        user_id: UserId,
        query: &TaskListQuery,
    ) -> Result<RegionGroups, TaskServiceError> {
        let tasks = self.list_tasks(user_id, query)?;
        Ok(RegionGroups::from_tasks(tasks))
    }

    fn save(&self, task: &Task, action: &str) -> Result<(), TaskServiceError> {
        self.tasks.update_task(task)?;
        info!(
            "event=task_{} module=service status=ok user_id={} task_id={} task_status={}",
            action,
            task.user_id,
            task.id,
            task.status.as_str().replace(' ', "_")
        );
        Ok(())
    }
}
