//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its status lifecycle and edit semantics.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `completed_date` is `Some` exactly when `status == Completed`.
//! - Only completed tasks can be reopened.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::priority::{Priority, PriorityFlags, SungRegion};
use super::user::UserId;
use super::ValidationError;

/// Storage and CLI date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row id of an active task.
pub type TaskId = i64;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ValidationError::InvalidStatus(value.to_string())),
        }
    }
}

/// A persisted task owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priorities: PriorityFlags,
    pub status: TaskStatus,
    pub completed_date: Option<NaiveDate>,
}

/// Input for creating a task.
///
/// `priorities == None` means "use the owner's default priorities".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priorities: Option<PriorityFlags>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` fields are left untouched.
///
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub importance: Option<Priority>,
    pub urgency: Option<Priority>,
    pub fitness: Option<Priority>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Task {
    /// Builds an unsaved open task from a draft with resolved priorities.
    ///
    /// The returned task has `id == 0` until the repository assigns one.
    pub fn from_draft(user_id: UserId, draft: TaskDraft, priorities: PriorityFlags) -> Self {
        Self {
            id: 0,
            user_id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            due_date: draft.due_date,
            priorities,
            status: TaskStatus::Open,
            completed_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let completed = self.status == TaskStatus::Completed;
        if completed != self.completed_date.is_some() {
            return Err(ValidationError::CompletionMismatch);
        }
        Ok(())
    }

    pub fn apply_edit(&mut self, edit: TaskEdit) {
        if let Some(title) = edit.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = edit.description {
            self.description = description.trim().to_string();
        }
        if let Some(due_date) = edit.due_date {
            self.due_date = due_date;
        }
        if let Some(importance) = edit.importance {
            self.priorities.importance = importance;
        }
        if let Some(urgency) = edit.urgency {
            self.priorities.urgency = urgency;
        }
        if let Some(fitness) = edit.fitness {
            self.priorities.fitness = fitness;
        }
    }

    /// Moves an open task to in-progress. Returns `false` if not open.
    pub fn start(&mut self) -> bool {
        if self.status != TaskStatus::Open {
            return false;
        }
        self.status = TaskStatus::InProgress;
        true
    }

    pub fn mark_completed(&mut self, today: NaiveDate) {
        self.status = TaskStatus::Completed;
        self.completed_date = Some(today);
    }

    /// Reopens a completed task. Returns `false` if it was not completed.
    pub fn reopen(&mut self) -> bool {
        if self.status != TaskStatus::Completed {
            return false;
        }
        self.status = TaskStatus::Open;
        self.completed_date = None;
        true
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn region(&self) -> SungRegion {
        self.priorities.region()
    }

    /// Whole days from `today` until the due date; negative when overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days())
    }
}
