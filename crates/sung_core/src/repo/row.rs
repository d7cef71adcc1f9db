//! Column codecs and filter SQL shared by the task and archive tables.

use crate::model::priority::{Priority, PriorityFlags};
use crate::model::task::{TaskStatus, DATE_FORMAT};
use crate::repo::task_repo::TaskListQuery;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;

pub(super) fn priority_to_db(priority: Priority) -> &'static str {
    priority.as_str()
}

pub(super) fn status_to_db(status: TaskStatus) -> &'static str {
    status.as_str()
}

pub(super) fn date_to_db(date: Option<NaiveDate>) -> Option<String> {
    date.map(|value| value.format(DATE_FORMAT).to_string())
}

pub(super) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(super) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

pub(super) fn read_priorities(row: &Row<'_>, table: &str) -> RepoResult<PriorityFlags> {
    Ok(PriorityFlags {
        importance: read_priority(row, table, "importance")?,
        urgency: read_priority(row, table, "urgency")?,
        fitness: read_priority(row, table, "fitness")?,
    })
}

fn read_priority(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Priority> {
    let value: String = row.get(column)?;
    match value.as_str() {
        "Low" => Ok(Priority::Low),
        "High" => Ok(Priority::High),
        _ => Err(RepoError::InvalidData(format!(
            "invalid priority `{value}` in {table}.{column}"
        ))),
    }
}

pub(super) fn read_status(row: &Row<'_>, table: &str) -> RepoResult<TaskStatus> {
    let value: String = row.get("status")?;
    match value.as_str() {
        "Open" => Ok(TaskStatus::Open),
        "In Progress" => Ok(TaskStatus::InProgress),
        "Completed" => Ok(TaskStatus::Completed),
        _ => Err(RepoError::InvalidData(format!(
            "invalid status `{value}` in {table}.status"
        ))),
    }
}

pub(super) fn read_date(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => NaiveDate::parse_from_str(&value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date `{value}` in {table}.{column}"))
            }),
        None => Ok(None),
    }
}

/// Appends `AND ...` clauses for `query` to a statement that already has a
/// `WHERE` clause.
pub(super) fn push_task_filters(sql: &mut String, binds: &mut Vec<Value>, query: &TaskListQuery) {
    let flags = [
        ("importance", query.importance),
        ("urgency", query.urgency),
        ("fitness", query.fitness),
    ];
    for (column, value) in flags {
        if let Some(priority) = value {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(Value::Text(priority_to_db(priority).to_string()));
        }
    }

    if let Some(search) = query.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            sql.push_str(" AND title LIKE ? ESCAPE '\\'");
            binds.push(Value::Text(format!("%{}%", escape_like(search))));
        }
    }

    if let Some(status) = query.status {
        sql.push_str(" AND status = ?");
        binds.push(Value::Text(status_to_db(status).to_string()));
    }

    if let Some(due) = query.due_on_or_before {
        sql.push_str(" AND due_date IS NOT NULL AND due_date <= ?");
        binds.push(Value::Text(due.format(DATE_FORMAT).to_string()));
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
