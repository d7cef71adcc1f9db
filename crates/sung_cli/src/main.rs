//! `sung` command-line front end.
//!
//! # Responsibility
//! - Resolve database and log locations from flags, environment and defaults.
//! - Hand the parsed command to the core services and print the result.

mod cli;
mod commands;
mod render;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::commands::App;

const APP_DIR: &str = "sung";
const DB_FILE: &str = "sung.sqlite3";

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let base = data_dir();

    let mut log_dir = cli.log_dir.unwrap_or_else(|| base.join("logs"));
    if log_dir.is_relative() {
        log_dir = std::env::current_dir()
            .context("resolving log directory")?
            .join(log_dir);
    }
    let level = cli
        .log_level
        .unwrap_or_else(|| sung_core::default_log_level().to_string());
    if let Err(err) = sung_core::init_logging(&level, &log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let db_path = cli.db.unwrap_or_else(|| base.join(DB_FILE));
    let conn = sung_core::open_db(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    let today = chrono::Local::now().date_naive();
    let stdout = std::io::stdout();
    App::new(&conn, today).execute(cli.command, &mut stdout.lock())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
