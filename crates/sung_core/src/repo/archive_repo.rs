//! Archive repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Move completed tasks from `tasks` into `archived_tasks`.
//! - List, inspect and purge archived rows.
//!
//! # Invariants
//! - Archiving inserts the snapshot and deletes the active row in one
//!   transaction; a task is never in both tables.
//! - Only `Completed` tasks enter the archive.

use crate::model::archive::{ArchivedTask, ArchivedTaskId};
use crate::model::task::{Task, TaskStatus, DATE_FORMAT};
use crate::model::user::UserId;
use crate::repo::row::{
    date_to_db, priority_to_db, push_task_filters, read_date, read_priorities, read_status,
    status_to_db,
};
use crate::repo::task_repo::TaskListQuery;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ARCHIVE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    source_task_id,
    title,
    description,
    due_date,
    importance,
    urgency,
    fitness,
    status,
    completed_date,
    archived_date
FROM archived_tasks";

/// Repository interface for archived tasks.
pub trait ArchiveRepository {
    /// Moves `task` into the archive, stamped with `archived_date`.
    fn archive_task(&self, task: &Task, archived_date: NaiveDate) -> RepoResult<ArchivedTaskId>;
    fn get_archived(&self, user_id: UserId, id: ArchivedTaskId)
        -> RepoResult<Option<ArchivedTask>>;
    /// Lists matching archived tasks, most recently archived first.
    fn list_archived(&self, user_id: UserId, query: &TaskListQuery)
        -> RepoResult<Vec<ArchivedTask>>;
    fn delete_archived(&self, user_id: UserId, id: ArchivedTaskId) -> RepoResult<()>;
    /// Deletes rows archived on or before `cutoff`; returns how many.
    fn delete_archived_before(&self, user_id: UserId, cutoff: NaiveDate) -> RepoResult<usize>;
}

/// SQLite-backed archive repository.
pub struct SqliteArchiveRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArchiveRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ArchiveRepository for SqliteArchiveRepository<'_> {
    fn archive_task(&self, task: &Task, archived_date: NaiveDate) -> RepoResult<ArchivedTaskId> {
        task.validate()?;
        if task.status != TaskStatus::Completed {
            return Err(RepoError::Conflict(format!(
                "task {} is not completed and cannot be archived",
                task.id
            )));
        }

        let snapshot = ArchivedTask::from_task(task, archived_date);
        let tx = self.conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2;",
            params![task.id, task.user_id],
        )?;
        if removed == 0 {
            return Err(RepoError::not_found("task", task.id));
        }

        tx.execute(
            "INSERT INTO archived_tasks (
                user_id,
                source_task_id,
                title,
                description,
                due_date,
                importance,
                urgency,
                fitness,
                status,
                completed_date,
                archived_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                snapshot.user_id,
                snapshot.source_task_id,
                snapshot.title.as_str(),
                snapshot.description.as_str(),
                date_to_db(snapshot.due_date),
                priority_to_db(snapshot.priorities.importance),
                priority_to_db(snapshot.priorities.urgency),
                priority_to_db(snapshot.priorities.fitness),
                status_to_db(snapshot.status),
                date_to_db(snapshot.completed_date),
                snapshot.archived_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        let archived_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(archived_id)
    }

    fn get_archived(
        &self,
        user_id: UserId,
        id: ArchivedTaskId,
    ) -> RepoResult<Option<ArchivedTask>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ARCHIVE_SELECT_SQL}
             WHERE id = ?1 AND user_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id, user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_archived_row(row)?));
        }

        Ok(None)
    }

    fn list_archived(
        &self,
        user_id: UserId,
        query: &TaskListQuery,
    ) -> RepoResult<Vec<ArchivedTask>> {
        let mut sql = format!("{ARCHIVE_SELECT_SQL} WHERE user_id = ?");
        let mut bind_values = vec![Value::Integer(user_id)];
        push_task_filters(&mut sql, &mut bind_values, query);
        sql.push_str(" ORDER BY archived_date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut archived = Vec::new();

        while let Some(row) = rows.next()? {
            archived.push(parse_archived_row(row)?);
        }

        Ok(archived)
    }

    fn delete_archived(&self, user_id: UserId, id: ArchivedTaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM archived_tasks WHERE id = ?1 AND user_id = ?2;",
            params![id, user_id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("archived task", id));
        }

        Ok(())
    }

    fn delete_archived_before(&self, user_id: UserId, cutoff: NaiveDate) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM archived_tasks WHERE user_id = ?1 AND archived_date <= ?2;",
            params![user_id, cutoff.format(DATE_FORMAT).to_string()],
        )?;
        Ok(removed)
    }
}

fn parse_archived_row(row: &Row<'_>) -> RepoResult<ArchivedTask> {
    let archived_date = read_date(row, "archived_tasks", "archived_date")?.ok_or_else(|| {
        RepoError::InvalidData("missing archived_tasks.archived_date".to_string())
    })?;

    Ok(ArchivedTask {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        source_task_id: row.get("source_task_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: read_date(row, "archived_tasks", "due_date")?,
        priorities: read_priorities(row, "archived_tasks")?,
        status: read_status(row, "archived_tasks")?,
        completed_date: read_date(row, "archived_tasks", "completed_date")?,
        archived_date,
    })
}
