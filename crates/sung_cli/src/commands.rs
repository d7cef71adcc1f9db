//! Executes parsed commands against an open database.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::io::Write;
use sung_core::diagram::{layout, priorities_at};
use sung_core::{
    AccountService, ArchiveService, NotificationService, PriorityFlags, SettingsService,
    SqliteArchiveRepository, SqliteSettingsRepository, SqliteTaskRepository,
    SqliteUserRepository, SungRegion, TaskDraft, TaskEdit, TaskService, User,
};

use crate::cli::{AddArgs, Command, EditArgs, PriorityArgs, SettingsCommand};
use crate::render;

type Tasks<'conn> = TaskService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>;
type Archive<'conn> = ArchiveService<
    SqliteTaskRepository<'conn>,
    SqliteArchiveRepository<'conn>,
    SqliteSettingsRepository<'conn>,
>;

/// Service wiring for one invocation.
pub struct App<'conn> {
    conn: &'conn Connection,
    today: NaiveDate,
}

impl<'conn> App<'conn> {
    pub fn new(conn: &'conn Connection, today: NaiveDate) -> Self {
        Self { conn, today }
    }

    fn accounts(&self) -> AccountService<SqliteUserRepository<'conn>> {
        AccountService::new(SqliteUserRepository::new(self.conn))
    }

    fn tasks(&self) -> Tasks<'conn> {
        TaskService::new(
            SqliteTaskRepository::new(self.conn),
            SqliteSettingsRepository::new(self.conn),
        )
    }

    fn archive(&self) -> Archive<'conn> {
        ArchiveService::new(
            SqliteTaskRepository::new(self.conn),
            SqliteArchiveRepository::new(self.conn),
            SqliteSettingsRepository::new(self.conn),
        )
    }

    fn notifications(
        &self,
    ) -> NotificationService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>> {
        NotificationService::new(
            SqliteTaskRepository::new(self.conn),
            SqliteSettingsRepository::new(self.conn),
        )
    }

    fn settings(&self) -> SettingsService<SqliteSettingsRepository<'conn>> {
        SettingsService::new(SqliteSettingsRepository::new(self.conn))
    }

    fn session_user(&self) -> anyhow::Result<User> {
        self.accounts()
            .require_user()
            .context("run `sung login <username>` first")
    }

    pub fn execute<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<()> {
        match command {
            Command::Register { username, password } => {
                let user = self.accounts().register(&username, &password)?;
                writeln!(out, "registered {} (#{})", user.username, user.id)?;
            }
            Command::Login { username, password } => {
                let user = self.accounts().login(&username, &password)?;
                writeln!(out, "logged in as {}", user.username)?;
                let report = self.archive().run_maintenance(user.id, self.today)?;
                render::maintenance(out, &report)?;
                let due = self.notifications().due_notifications(user.id, self.today)?;
                render::notifications(out, &due)?;
            }
            Command::Logout => match self.accounts().logout()? {
                Some(_) => writeln!(out, "logged out")?,
                None => writeln!(out, "no active session")?,
            },
            Command::Whoami => match self.accounts().current_user()? {
                Some(user) => writeln!(out, "{} (#{})", user.username, user.id)?,
                None => writeln!(out, "not logged in")?,
            },
            Command::Passwd {
                username,
                old_password,
                new_password,
            } => {
                self.accounts()
                    .change_password(&username, &old_password, &new_password)?;
                writeln!(out, "password changed")?;
            }
            Command::Unregister { username, password } => {
                self.accounts().delete_account(&username, &password)?;
                writeln!(out, "deleted account {username}")?;
            }
            Command::Add(args) => self.add(args, out)?,
            Command::Edit(args) => self.edit(args, out)?,
            Command::Start { id } => {
                let user = self.session_user()?;
                let task = self.tasks().start_task(user.id, id)?;
                render::task_detail(out, &task)?;
            }
            Command::Complete { id } => {
                let user = self.session_user()?;
                let task = self.tasks().complete_task(user.id, id, self.today)?;
                render::task_detail(out, &task)?;
                if let Some(archived) = self.archive().archive_if_due(user.id, id, self.today)? {
                    writeln!(out, "archived task {id} as #{}", archived.id)?;
                }
            }
            Command::Reopen { id } => {
                let user = self.session_user()?;
                let task = self.tasks().reopen_task(user.id, id)?;
                render::task_detail(out, &task)?;
            }
            Command::Delete { id } => {
                let user = self.session_user()?;
                self.tasks().delete_task(user.id, id)?;
                writeln!(out, "deleted task {id}")?;
            }
            Command::List { filter, json } => {
                let user = self.session_user()?;
                let tasks = self.tasks().list_tasks(user.id, &filter.to_query())?;
                if json {
                    render::json(out, &tasks)?;
                } else {
                    render::task_table(out, &tasks)?;
                }
            }
            Command::Diagram {
                filter,
                coords,
                json,
            } => {
                let user = self.session_user()?;
                let query = filter.to_query();
                if coords || json {
                    let tasks = self.tasks().list_tasks(user.id, &query)?;
                    let placed = layout(&tasks);
                    if json {
                        render::json(out, &placed)?;
                    } else {
                        render::layout(out, &placed, &tasks)?;
                    }
                } else {
                    let groups = self.tasks().group_by_region(user.id, &query)?;
                    render::region_groups(out, &groups)?;
                }
            }
            Command::Archive { id } => {
                let user = self.session_user()?;
                let archived = self.archive().archive_task(user.id, id, self.today)?;
                writeln!(out, "archived task {id} as #{}", archived.id)?;
            }
            Command::Archived { filter, json } => {
                let user = self.session_user()?;
                let archived = self.archive().list_archived(user.id, &filter.to_query())?;
                if json {
                    render::json(out, &archived)?;
                } else {
                    render::archived_table(out, &archived)?;
                }
            }
            Command::Purge { id } => {
                let user = self.session_user()?;
                self.archive().delete_archived(user.id, id)?;
                writeln!(out, "purged archived task {id}")?;
            }
            Command::Maintain => {
                let user = self.session_user()?;
                let report = self.archive().run_maintenance(user.id, self.today)?;
                if report.archived.is_empty() && report.purged == 0 {
                    writeln!(out, "nothing to do")?;
                } else {
                    render::maintenance(out, &report)?;
                }
            }
            Command::Notify { json } => {
                let user = self.session_user()?;
                let due = self.notifications().due_notifications(user.id, self.today)?;
                if json {
                    render::json(out, &due)?;
                } else if due.is_empty() {
                    writeln!(out, "nothing due")?;
                } else {
                    render::notifications(out, &due)?;
                }
            }
            Command::Settings { command } => self.settings_command(command, out)?,
            Command::DropTarget { x, y } => {
                let flags = priorities_at(x, y);
                writeln!(
                    out,
                    "importance={} urgency={} fitness={} region={} ({})",
                    flags.importance,
                    flags.urgency,
                    flags.fitness,
                    flags.region().code(),
                    flags.region().name()
                )?;
            }
        }
        Ok(())
    }

    fn add<W: Write>(&self, args: AddArgs, out: &mut W) -> anyhow::Result<()> {
        let user = self.session_user()?;
        let settings = self.settings().get(user.id)?;
        let priorities = resolve_priorities(
            &args.priorities,
            args.region,
            settings.default_priorities,
        );

        let draft = TaskDraft {
            title: args.title,
            description: args.description,
            due_date: args.due,
            priorities,
        };
        let task = self.tasks().add_task(user.id, draft)?;
        render::task_detail(out, &task)?;
        Ok(())
    }

    fn edit<W: Write>(&self, args: EditArgs, out: &mut W) -> anyhow::Result<()> {
        let user = self.session_user()?;
        let mut edit = TaskEdit {
            title: args.title,
            description: args.description,
            due_date: match (args.due, args.clear_due) {
                (_, true) => Some(None),
                (Some(due), false) => Some(Some(due)),
                (None, false) => None,
            },
            importance: args.priorities.importance,
            urgency: args.priorities.urgency,
            fitness: args.priorities.fitness,
        };
        if let Some(region) = args.region {
            let flags = region.flags();
            edit.importance = Some(flags.importance);
            edit.urgency = Some(flags.urgency);
            edit.fitness = Some(flags.fitness);
        }

        let task = self.tasks().edit_task(user.id, args.id, edit)?;
        render::task_detail(out, &task)?;
        Ok(())
    }

    fn settings_command<W: Write>(
        &self,
        command: SettingsCommand,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let user = self.session_user()?;
        let service = self.settings();
        let settings = match command {
            SettingsCommand::Show { json } => {
                let settings = service.get(user.id)?;
                if json {
                    return render::json(out, &settings);
                }
                settings
            }
            SettingsCommand::Set {
                interval,
                notifications,
                auto_archive,
                archive_after,
                auto_delete,
                delete_after,
            } => service.update(user.id, |settings| {
                if let Some(days) = interval {
                    settings.notification_interval_days = days;
                }
                if let Some(enabled) = notifications {
                    settings.notifications_enabled = enabled;
                }
                if let Some(enabled) = auto_archive {
                    settings.auto_archive = enabled;
                }
                if let Some(days) = archive_after {
                    settings.archive_after_days = days;
                }
                if let Some(enabled) = auto_delete {
                    settings.auto_delete = enabled;
                }
                if let Some(days) = delete_after {
                    settings.delete_after_days = days;
                }
            })?,
            SettingsCommand::Defaults { priorities, region } => {
                if priorities.is_empty() && region.is_none() {
                    bail!("pass --importance, --urgency, --fitness or --region");
                }
                let current = service.get(user.id)?.default_priorities;
                let resolved = resolve_priorities(&priorities, region, current)
                    .unwrap_or(current);
                service.update_default_priorities(user.id, resolved)?
            }
        };
        render::settings(out, &settings)?;
        Ok(())
    }
}

/// Combines a region code, single flags and a fallback into task priorities.
///
/// Returns `None` when nothing was given so the service applies its defaults.
fn resolve_priorities(
    args: &PriorityArgs,
    region: Option<SungRegion>,
    fallback: PriorityFlags,
) -> Option<PriorityFlags> {
    if let Some(region) = region {
        return Some(region.flags());
    }
    if args.is_empty() {
        return None;
    }
    Some(PriorityFlags::new(
        args.importance.unwrap_or(fallback.importance),
        args.urgency.unwrap_or(fallback.urgency),
        args.fitness.unwrap_or(fallback.fitness),
    ))
}
