//! Plain-text and JSON output for the `sung` binary.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use sung_core::diagram::{DiagramLayout, RegionGroups};
use sung_core::{ArchivedTask, MaintenanceReport, Notification, Settings, Task, TaskId};

pub fn json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn task_table<W: Write>(out: &mut W, tasks: &[Task]) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "no tasks");
    }
    writeln!(out, "{:>5}  {:<11}  {:<4}  {:<10}  TITLE", "ID", "STATUS", "AREA", "DUE")?;
    for task in tasks {
        writeln!(
            out,
            "{:>5}  {:<11}  {:<4}  {:<10}  {}",
            task.id,
            task.status.as_str(),
            task.region().code(),
            date_or_dash(task.due_date),
            task.title
        )?;
    }
    Ok(())
}

pub fn task_detail<W: Write>(out: &mut W, task: &Task) -> io::Result<()> {
    writeln!(out, "#{} {}", task.id, task.title)?;
    if !task.description.is_empty() {
        writeln!(out, "  {}", task.description)?;
    }
    writeln!(
        out,
        "  status: {}  due: {}  region: {} ({})",
        task.status,
        date_or_dash(task.due_date),
        task.region().name(),
        task.region().code()
    )?;
    writeln!(
        out,
        "  importance: {}  urgency: {}  fitness: {}",
        task.priorities.importance, task.priorities.urgency, task.priorities.fitness
    )?;
    if let Some(completed) = task.completed_date {
        writeln!(out, "  completed: {completed}")?;
    }
    Ok(())
}

pub fn archived_table<W: Write>(out: &mut W, tasks: &[ArchivedTask]) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "archive is empty");
    }
    writeln!(
        out,
        "{:>5}  {:<4}  {:<10}  {:<10}  TITLE",
        "ID", "AREA", "COMPLETED", "ARCHIVED"
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:>5}  {:<4}  {:<10}  {:<10}  {}",
            task.id,
            task.region().code(),
            date_or_dash(task.completed_date),
            task.archived_date,
            task.title
        )?;
    }
    Ok(())
}

/// Region-by-region listing; empty regions are skipped.
pub fn region_groups<W: Write>(out: &mut W, groups: &RegionGroups) -> io::Result<()> {
    if groups.total() == 0 {
        return writeln!(out, "no tasks");
    }
    for (region, tasks) in groups.iter().filter(|(_, tasks)| !tasks.is_empty()) {
        writeln!(out, "[{}] {} ({})", region.code(), region.name(), tasks.len())?;
        for task in tasks {
            writeln!(
                out,
                "  {:>5}  {:<11}  {}",
                task.id,
                task.status.as_str(),
                task.title
            )?;
        }
    }
    Ok(())
}

pub fn layout<W: Write>(out: &mut W, layout: &DiagramLayout, tasks: &[Task]) -> io::Result<()> {
    let titles: HashMap<TaskId, &str> = tasks
        .iter()
        .map(|task| (task.id, task.title.as_str()))
        .collect();
    let title = |id: &TaskId| titles.get(id).copied().unwrap_or("");

    for placement in &layout.placements {
        writeln!(
            out,
            "{:>5}  {:<4}  ({:>6.1}, {:>6.1})  {}",
            placement.task_id,
            placement.region.code(),
            placement.position.x,
            placement.position.y,
            title(&placement.task_id)
        )?;
    }
    if !layout.low_priority.is_empty() {
        writeln!(out, "LOW Priority Tasks:")?;
        for id in &layout.low_priority {
            writeln!(out, "{:>5}  {}", id, title(id))?;
        }
    }
    Ok(())
}

pub fn notifications<W: Write>(out: &mut W, notifications: &[Notification]) -> io::Result<()> {
    for notification in notifications {
        let when = match notification.days_until_due {
            days if days < 0 => format!("overdue by {} day(s)", -days),
            0 => "due today".to_string(),
            1 => "due tomorrow".to_string(),
            days => format!("due in {days} days"),
        };
        writeln!(
            out,
            "Task \"{}\" (#{}) is {} ({})",
            notification.title, notification.task_id, when, notification.due_date
        )?;
    }
    Ok(())
}

pub fn settings<W: Write>(out: &mut W, settings: &Settings) -> io::Result<()> {
    let on_off = |value: bool| if value { "on" } else { "off" };
    writeln!(
        out,
        "notifications:      {} (within {} day(s))",
        on_off(settings.notifications_enabled),
        settings.notification_interval_days
    )?;
    writeln!(
        out,
        "auto-archive:       {} (after {} day(s))",
        on_off(settings.auto_archive),
        settings.archive_after_days
    )?;
    writeln!(
        out,
        "auto-delete:        {} (after {} day(s))",
        on_off(settings.auto_delete),
        settings.delete_after_days
    )?;
    let defaults = settings.default_priorities;
    writeln!(
        out,
        "default priorities: importance={} urgency={} fitness={} [{}]",
        defaults.importance,
        defaults.urgency,
        defaults.fitness,
        defaults.region().code()
    )
}

pub fn maintenance<W: Write>(out: &mut W, report: &MaintenanceReport) -> io::Result<()> {
    if report.archived.is_empty() && report.purged == 0 {
        return Ok(());
    }
    writeln!(
        out,
        "maintenance: archived {} task(s), purged {} archived task(s)",
        report.archived.len(),
        report.purged
    )
}
