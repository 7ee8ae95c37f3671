//! Week board entry point and terminal setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::cmd::Context;
use crate::error::{Error, Result};
use crate::filter::FilterCriteria;
use crate::tui::board::WeekBoard;
use crate::week::WeekWindow;

/// Initialise the terminal, run the week board until the user quits, and
/// restore the terminal even when the board loop fails.
pub fn run_board(ctx: Context, window: WeekWindow, criteria: FilterCriteria) -> Result<()> {
    let home = ctx.home.clone();
    run_terminal(WeekBoard::new(ctx, window, criteria)).map_err(|e| Error::io(home, e))
}

fn run_terminal(mut board: WeekBoard) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = board.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::debug!(window = %board.window().label(), "week board closed");
    result
}
