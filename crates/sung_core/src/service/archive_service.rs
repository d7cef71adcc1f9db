//! Archive use-case service.
//!
//! # Responsibility
//! - Archive completed tasks on request.
//! - Run the settings-driven maintenance pass (auto-archive, auto-delete).
//!
//! # Invariants
//! - Open and in-progress tasks are never archived.
//! - Maintenance is a no-op for switches that are off in settings.
//! - A maintenance error after some tasks moved still reports those tasks.

use crate::model::archive::{ArchivedTask, ArchivedTaskId};
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::model::user::UserId;
use crate::repo::archive_repo::ArchiveRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoError;
use chrono::{Days, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ArchiveError {
    TaskNotFound(TaskId),
    ArchivedNotFound(ArchivedTaskId),
    NotCompleted { id: TaskId, status: TaskStatus },
    /// Maintenance stopped part way; `report` holds what was already committed.
    MaintenanceInterrupted {
        report: MaintenanceReport,
        source: Box<ArchiveError>,
    },
    Repo(RepoError),
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ArchivedNotFound(id) => write!(f, "archived task not found: {id}"),
            Self::NotCompleted { id, status } => write!(
                f,
                "only completed tasks can be archived; task {id} is {status}"
            ),
            Self::MaintenanceInterrupted { report, .. } => write!(
                f,
                "maintenance stopped after archiving {} task(s)",
                report.archived.len()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MaintenanceInterrupted { source, .. } => Some(source.as_ref()),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ArchiveError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "task", id } => Self::TaskNotFound(id),
            RepoError::NotFound {
                entity: "archived task",
                id,
            } => Self::ArchivedNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Active task ids moved into the archive.
    pub archived: Vec<TaskId>,
    /// Number of archived rows deleted.
    pub purged: usize,
}

/// Whether a completed task is old enough to be auto-archived.
pub fn is_due_for_archive(task: &Task, archive_after_days: i64, today: NaiveDate) -> bool {
    match (task.status, task.completed_date) {
        (TaskStatus::Completed, Some(completed)) => {
            (today - completed).num_days() >= archive_after_days
        }
        _ => false,
    }
}

/// Whether an archived task has been kept long enough to be purged.
pub fn is_due_for_purge(task: &ArchivedTask, delete_after_days: i64, today: NaiveDate) -> bool {
    task.days_archived(today) >= delete_after_days
}

/// Archive facade over task, archive and settings repositories.
pub struct ArchiveService<T, A, S>
where
    T: TaskRepository,
    A: ArchiveRepository,
    S: SettingsRepository,
{
    tasks: T,
    archive: A,
    settings: S,
}

impl<T, A, S> ArchiveService<T, A, S>
where
    T: TaskRepository,
    A: ArchiveRepository,
    S: SettingsRepository,
{
    pub fn new(tasks: T, archive: A, settings: S) -> Self {
        Self {
            tasks,
            archive,
            settings,
        }
    }

    /// Moves one completed task into the archive.
    pub fn archive_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
        today: NaiveDate,
    ) -> Result<ArchivedTask, ArchiveError> {
        let task = self
            .tasks
            .get_task(user_id, task_id)?
            .ok_or(ArchiveError::TaskNotFound(task_id))?;
        self.archive_loaded(&task, today)
    }

    pub fn get_archived(
        &self,
        user_id: UserId,
        id: ArchivedTaskId,
    ) -> Result<ArchivedTask, ArchiveError> {
        self.archive
            .get_archived(user_id, id)?
            .ok_or(ArchiveError::ArchivedNotFound(id))
    }

    pub fn list_archived(
        &self,
        user_id: UserId,
        query: &TaskListQuery,
    ) -> Result<Vec<ArchivedTask>, ArchiveError> {
        Ok(self.archive.list_archived(user_id, query)?)
    }

    pub fn delete_archived(&self, user_id: UserId, id: ArchivedTaskId) -> Result<(), ArchiveError> {
        self.archive.delete_archived(user_id, id)?;
        info!("event=archive_delete module=service status=ok user_id={user_id} archived_id={id}");
        Ok(())
    }

    /// Archives a just-completed task when auto-archive is on and its
    /// threshold is already met. Returns `None` when the task stays active.
    pub fn archive_if_due(
        &self,
        user_id: UserId,
        task_id: TaskId,
        today: NaiveDate,
    ) -> Result<Option<ArchivedTask>, ArchiveError> {
        let settings = self.settings.get_settings(user_id)?;
        if !settings.auto_archive {
            return Ok(None);
        }

        let task = self
            .tasks
            .get_task(user_id, task_id)?
            .ok_or(ArchiveError::TaskNotFound(task_id))?;
        if !is_due_for_archive(&task, settings.archive_after_days, today) {
            return Ok(None);
        }
        self.archive_loaded(&task, today).map(Some)
    }

    /// Applies auto-archive and auto-delete according to the user's settings.
    ///
    /// Each archived task commits on its own. If a later step fails, the error
    /// is `MaintenanceInterrupted` and carries the tasks already moved.
    pub fn run_maintenance(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<MaintenanceReport, ArchiveError> {
        let settings = self.settings.get_settings(user_id)?;
        let mut report = MaintenanceReport::default();

        if settings.auto_archive {
            let completed = TaskListQuery {
                status: Some(TaskStatus::Completed),
                ..TaskListQuery::default()
            };
            for task in self.tasks.list_tasks(user_id, &completed)? {
                if !is_due_for_archive(&task, settings.archive_after_days, today) {
                    continue;
                }
                if let Err(err) = self.archive_loaded(&task, today) {
                    return Err(interrupted(report, err));
                }
                report.archived.push(task.id);
            }
        }

        if settings.auto_delete {
            // `days_archived >= n` is the same as `archived_date <= today - n`.
            let cutoff = u64::try_from(settings.delete_after_days)
                .ok()
                .and_then(|days| today.checked_sub_days(Days::new(days)));
            if let Some(cutoff) = cutoff {
                match self.archive.delete_archived_before(user_id, cutoff) {
                    Ok(purged) => report.purged = purged,
                    Err(err) => return Err(interrupted(report, err.into())),
                }
            }
        }

        info!(
            "event=archive_maintenance module=service status=ok user_id={} archived={} purged={}",
            user_id,
            report.archived.len(),
            report.purged
        );
        Ok(report)
    }

    fn archive_loaded(&self, task: &Task, today: NaiveDate) -> Result<ArchivedTask, ArchiveError> {
        if !task.is_completed() {
            return Err(ArchiveError::NotCompleted {
                id: task.id,
                status: task.status,
            });
        }

        let archived_id = self.archive.archive_task(task, today)?;
        info!(
            "event=task_archive module=service status=ok user_id={} task_id={} archived_id={}",
            task.user_id, task.id, archived_id
        );

        let mut archived = ArchivedTask::from_task(task, today);
        archived.id = archived_id;
        Ok(archived)
    }
}

fn interrupted(report: MaintenanceReport, err: ArchiveError) -> ArchiveError {
    warn!(
        "event=archive_maintenance module=service status=error archived={}",
        report.archived.len()
    );
    ArchiveError::MaintenanceInterrupted {
        report,
        source: Box::new(err),
    }
}
