//! # tb - task dashboard CLI
//!
//! Tasks carry a client, a sector, a priority, a due date and the name of
//! whoever is responsible. `tb list` shows them as a card list, `tb week`
//! as a seven-day calendar and `tb ui` as an interactive week board.
//!
//! ```bash
//! tb login ana --name "Ana"
//! tb add "Landing page copy" --client Acme --sector Design --due friday --priority high
//! tb week --sector Design
//! tb week --offset 1
//! tb ui
//! ```
//!
//! Data lives in `~/.taskboard/` (or `$TASKBOARD_HOME`). Set `RUST_LOG=debug`
//! to see store activity on stderr.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard::cli::Cli;
use taskboard::cmd;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cmd::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
