//! # taskboard
//!
//! A task dashboard for small teams: tasks carry a client, a sector, a
//! priority, a due date and the name of whoever is responsible, and are shown
//! either as a card list or as a seven-day calendar.
//!
//! ## Layout
//!
//! - [`filter`], [`week`] and [`projection`] are the pure core: exact-match
//!   filters, week windows, and the projection that turns a task collection
//!   into the card list, the week subset and the per-day calendar buckets.
//! - [`store`] persists tasks behind the [`store::TaskStore`] trait.
//! - [`session`] and [`config`] hold the signed-in identity and preferences.
//! - [`cmd`] and [`tui`] are the command line and the terminal week board.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use taskboard::fields::{ViewKind, WeekStart};
//! use taskboard::filter::FilterCriteria;
//! use taskboard::projection::project;
//! use taskboard::store::{JsonStore, TaskQuery, TaskStore};
//! use taskboard::week::initial_window;
//!
//! let store = JsonStore::open("tasks.json".as_ref())?;
//! let tasks = store.list(&TaskQuery::default())?;
//! let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
//! let window = initial_window(today, WeekStart::Monday);
//! let p = project(&tasks, &FilterCriteria::default(), &window, ViewKind::Calendar);
//! for (day, tasks) in &p.by_day {
//!     println!("{day}: {}", tasks.len());
//! }
//! # Ok::<(), taskboard::Error>(())
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod error;
pub mod fields;
pub mod filter;
pub mod projection;
pub mod session;
pub mod store;
pub mod task;
pub mod week;
pub mod tui {
    pub mod board;
    pub mod colors;
    pub mod run;
}

pub use error::{Error, Result};
