//! Command-line surface of the `sung` binary.

use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use sung_core::model::parse_date;
use sung_core::{Priority, SungRegion, TaskListQuery, TaskStatus};

#[derive(Debug, Parser)]
#[command(name = "sung")]
#[command(version, about = "Sung Diagram task manager")]
pub struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, global = true, env = "SUNG_DB")]
    pub db: Option<PathBuf>,
    /// Directory for rolling log files.
    #[arg(long, global = true, env = "SUNG_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// trace, debug, info, warn or error.
    #[arg(long, global = true, env = "SUNG_LOG_LEVEL")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        username: String,
        #[arg(long, env = "SUNG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and run archive maintenance
    Login {
        username: String,
        #[arg(long, env = "SUNG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the active session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change an account password
    Passwd {
        username: String,
        #[arg(long = "old", env = "SUNG_PASSWORD", hide_env_values = true)]
        old_password: String,
        #[arg(long = "new")]
        new_password: String,
    },
    /// Delete an account and all of its tasks
    Unregister {
        username: String,
        #[arg(long, env = "SUNG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Add a task
    Add(AddArgs),
    /// Edit fields of a task
    Edit(EditArgs),
    /// Move an open task to In Progress
    Start { id: i64 },
    /// Mark a task completed today
    Complete { id: i64 },
    /// Reopen a completed task
    Reopen { id: i64 },
    /// Delete an active task
    Delete { id: i64 },
    /// List active tasks
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Show tasks grouped by diagram region
    Diagram {
        #[command(flatten)]
        filter: FilterArgs,
        /// Print canvas coordinates for each placed task
        #[arg(long)]
        coords: bool,
        #[arg(long)]
        json: bool,
    },
    /// Move a completed task to the archive
    Archive { id: i64 },
    /// List archived tasks
    Archived {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete an archived task
    Purge { id: i64 },
    /// Run auto-archive and auto-delete now
    Maintain,
    /// Show tasks that are due soon or overdue
    Notify {
        #[arg(long)]
        json: bool,
    },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Priorities for a task dropped at canvas position X Y
    DropTarget {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
    /// Due date, YYYY-MM-DD
    #[arg(long, value_parser = date_arg)]
    pub due: Option<NaiveDate>,
    #[command(flatten)]
    pub priorities: PriorityArgs,
    /// Region code (HHH, HH, HF, UF, I, U, F, LOW); overrides single flags
    #[arg(long, value_parser = region_arg)]
    pub region: Option<SungRegion>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long, value_parser = date_arg, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    #[arg(long)]
    pub clear_due: bool,
    #[command(flatten)]
    pub priorities: PriorityArgs,
    #[arg(long, value_parser = region_arg)]
    pub region: Option<SungRegion>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct PriorityArgs {
    #[arg(long, short = 'i')]
    pub importance: Option<Priority>,
    #[arg(long, short = 'u')]
    pub urgency: Option<Priority>,
    #[arg(long, short = 'f')]
    pub fitness: Option<Priority>,
}

impl PriorityArgs {
    pub fn is_empty(&self) -> bool {
        self.importance.is_none() && self.urgency.is_none() && self.fitness.is_none()
    }
}

/// The filter bar: every field is optional and means "All" when absent.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[command(flatten)]
    pub priorities: PriorityArgs,
    #[arg(long, value_parser = region_arg)]
    pub region: Option<SungRegion>,
    /// Title substring
    #[arg(long, short = 's')]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    /// Only tasks due on or before this date
    #[arg(long, value_parser = date_arg)]
    pub due_before: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_query(&self) -> TaskListQuery {
        let query = TaskListQuery {
            importance: self.priorities.importance,
            urgency: self.priorities.urgency,
            fitness: self.priorities.fitness,
            search: self.search.clone().filter(|text| !text.trim().is_empty()),
            status: self.status,
            due_on_or_before: self.due_before,
        };
        match self.region {
            Some(region) => query.with_region(region),
            None => query,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Change notification and archive preferences
    Set {
        /// Days ahead to notify about due tasks
        #[arg(long)]
        interval: Option<i64>,
        #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        notifications: Option<bool>,
        #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        auto_archive: Option<bool>,
        #[arg(long)]
        archive_after: Option<i64>,
        #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        auto_delete: Option<bool>,
        #[arg(long)]
        delete_after: Option<i64>,
    },
    /// Set the priorities applied to new tasks
    Defaults {
        #[command(flatten)]
        priorities: PriorityArgs,
        #[arg(long, value_parser = region_arg)]
        region: Option<SungRegion>,
    },
}

fn date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|err| err.to_string())
}

fn region_arg(value: &str) -> Result<SungRegion, String> {
    SungRegion::from_code(value).ok_or_else(|| {
        let codes: Vec<_> = SungRegion::ALL.iter().map(|region| region.code()).collect();
        format!("unknown region `{value}`; expected one of {}", codes.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, SettingsCommand};
    use clap::{CommandFactory, Parser};
    use sung_core::{Priority, SungRegion, TaskStatus};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_filters_build_a_query() {
        let cli = Cli::parse_from([
            "sung", "list", "--importance", "high", "--status", "in_progress", "--search", "rep",
            "--due-before", "2024-05-01",
        ]);
        let Command::List { filter, json } = cli.command else {
            panic!("expected list");
        };
        assert!(!json);
        let query = filter.to_query();
        assert_eq!(query.importance, Some(Priority::High));
        assert_eq!(query.urgency, None);
        assert_eq!(query.status, Some(TaskStatus::InProgress));
        assert_eq!(query.search.as_deref(), Some("rep"));
        assert!(query.due_on_or_before.is_some());
    }

    #[test]
    fn region_filter_pins_all_three_flags() {
        let cli = Cli::parse_from(["sung", "diagram", "--region", "uf"]);
        let Command::Diagram { filter, .. } = cli.command else {
            panic!("expected diagram");
        };
        assert_eq!(filter.region, Some(SungRegion::UrgentFit));
        let query = filter.to_query();
        assert_eq!(query.importance, Some(Priority::Low));
        assert_eq!(query.urgency, Some(Priority::High));
        assert_eq!(query.fitness, Some(Priority::High));
    }

    #[test]
    fn settings_set_accepts_boolish_values() {
        let cli = Cli::parse_from(["sung", "settings", "set", "--notifications", "off", "--interval", "3"]);
        let Command::Settings {
            command: SettingsCommand::Set {
                notifications,
                interval,
                auto_archive,
                ..
            },
        } = cli.command
        else {
            panic!("expected settings set");
        };
        assert_eq!(notifications, Some(false));
        assert_eq!(interval, Some(3));
        assert_eq!(auto_archive, None);
    }

    #[test]
    fn passwd_reads_old_password_from_the_environment() {
        let cmd = Cli::command();
        let passwd = cmd.find_subcommand("passwd").unwrap();
        let old = passwd
            .get_arguments()
            .find(|arg| arg.get_id() == "old_password")
            .unwrap();
        assert_eq!(old.get_env(), Some(std::ffi::OsStr::new("SUNG_PASSWORD")));

        let cli = Cli::parse_from(["sung", "passwd", "alice", "--old", "secret1", "--new", "secret2"]);
        let Command::Passwd {
            old_password,
            new_password,
            ..
        } = cli.command
        else {
            panic!("expected passwd");
        };
        assert_eq!(old_password, "secret1");
        assert_eq!(new_password, "secret2");
    }

    #[test]
    fn bad_dates_and_regions_are_rejected() {
        assert!(Cli::try_parse_from(["sung", "add", "x", "--due", "tomorrow"]).is_err());
        assert!(Cli::try_parse_from(["sung", "add", "x", "--region", "XYZ"]).is_err());
    }
}
