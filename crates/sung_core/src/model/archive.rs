//! Archived task snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::priority::{PriorityFlags, SungRegion};
use super::task::{Task, TaskId, TaskStatus};
use super::user::UserId;

pub type ArchivedTaskId = i64;

/// A completed task moved out of the active list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedTask {
    pub id: ArchivedTaskId,
    pub user_id: UserId,
    /// Id the task had while it was active.
    pub source_task_id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priorities: PriorityFlags,
    pub status: TaskStatus,
    pub completed_date: Option<NaiveDate>,
    pub archived_date: NaiveDate,
}

impl ArchivedTask {
    /// Snapshot of `task` taken on `archived_date`; `id` is assigned on insert.
    pub fn from_task(task: &Task, archived_date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id: task.user_id,
            source_task_id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priorities: task.priorities,
            status: task.status,
            completed_date: task.completed_date,
            archived_date,
        }
    }

    pub fn region(&self) -> SungRegion {
        self.priorities.region()
    }

    /// Whole days spent in the archive as of `today`.
    pub fn days_archived(&self, today: NaiveDate) -> i64 {
        (today - self.archived_date).num_days()
    }
}
