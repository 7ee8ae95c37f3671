use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::WeekStart;

/// Task dashboard with a card list and a weekly calendar.
/// Data lives in ~/.taskboard unless --home or TASKBOARD_HOME says otherwise.
#[derive(Parser)]
#[command(name = "tb", version, about = "Task dashboard CLI")]
pub struct Cli {
    /// Directory holding tasks, session and config.
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Path to the JSON task file (defaults to <home>/tasks.json).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// First day of the week, overriding config.json.
    #[arg(long, global = true, value_enum)]
    pub week_start: Option<WeekStart>,

    #[command(subcommand)]
    pub command: Commands,
}
