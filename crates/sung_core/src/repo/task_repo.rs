//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `tasks` table.
//! - Translate filter-bar queries into parameterized SQL.
//!
//! # Invariants
//! - Every statement is constrained by `user_id`; one user never sees or
//!   mutates another user's rows.
//! - Write paths call `Task::validate()` before SQL mutations.

use crate::model::priority::{Priority, SungRegion};
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::model::user::UserId;
use crate::repo::row::{
    date_to_db, priority_to_db, push_task_filters, read_date, read_priorities, read_status,
    status_to_db,
};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    due_date,
    importance,
    urgency,
    fitness,
    status,
    completed_date
FROM tasks";

/// Filters for task and archive listings; `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub importance: Option<Priority>,
    pub urgency: Option<Priority>,
    pub fitness: Option<Priority>,
    /// Title substring; case folding covers ASCII letters only.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    /// Only tasks with a due date on or before this day.
    pub due_on_or_before: Option<NaiveDate>,
}

impl TaskListQuery {
    /// Restricts the query to exactly one diagram region.
    pub fn with_region(mut self, region: SungRegion) -> Self {
        let flags = region.flags();
        self.importance = Some(flags.importance);
        self.urgency = Some(flags.urgency);
        self.fitness = Some(flags.fitness);
        self
    }
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Inserts `task` and returns the assigned id; `task.id` is ignored.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists matching tasks ordered by id.
    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                user_id,
                title,
                description,
                due_date,
                importance,
                urgency,
                fitness,
                status,
                completed_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.user_id,
                task.title.as_str(),
                task.description.as_str(),
                date_to_db(task.due_date),
                priority_to_db(task.priorities.importance),
                priority_to_db(task.priorities.urgency),
                priority_to_db(task.priorities.fitness),
                status_to_db(task.status),
                date_to_db(task.completed_date),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                due_date = ?3,
                importance = ?4,
                urgency = ?5,
                fitness = ?6,
                status = ?7,
                completed_date = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9 AND user_id = ?10;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                date_to_db(task.due_date),
                priority_to_db(task.priorities.importance),
                priority_to_db(task.priorities.urgency),
                priority_to_db(task.priorities.fitness),
                status_to_db(task.status),
                date_to_db(task.completed_date),
                task.id,
                task.user_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task.id));
        }

        Ok(())
    }

    fn get_task(&self, user_id: UserId, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE id = ?1 AND user_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, user_id: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values = vec![Value::Integer(user_id)];
        push_task_filters(&mut sql, &mut bind_values, query);
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, user_id: UserId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task = Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: read_date(row, "tasks", "due_date")?,
        priorities: read_priorities(row, "tasks")?,
        status: read_status(row, "tasks")?,
        completed_date: read_date(row, "tasks", "completed_date")?,
    };
    task.validate().map_err(|err| {
        RepoError::InvalidData(format!("task {} failed validation: {err}", task.id))
    })?;
    Ok(task)
}
