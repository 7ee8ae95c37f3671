//! Task projection: filter, restrict to a week, bucket by day.
//!
//! `project` is the single place the views get their task sets from. The
//! card grid renders `filtered`; the calendar renders `by_day`. Completed
//! tasks are hidden from calendar buckets only, so they never disappear from
//! `filtered` or `windowed`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::fields::{SortKey, Status, ViewKind};
use crate::filter::{matches, FilterCriteria};
use crate::task::Task;
use crate::week::{contains, WeekWindow};

/// The task sets derived for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a> {
    /// Tasks matching the criteria, in input order.
    pub filtered: Vec<&'a Task>,
    /// Filtered tasks due inside the window.
    pub windowed: Vec<&'a Task>,
    /// One entry per window day, each in `filtered` order.
    pub by_day: BTreeMap<NaiveDate, Vec<&'a Task>>,
}

/// Derive the filtered, windowed and per-day task sets.
pub fn project<'a>(
    tasks: &'a [Task],
    criteria: &FilterCriteria,
    window: &WeekWindow,
    view: ViewKind,
) -> Projection<'a> {
    let filtered: Vec<&Task> = tasks.iter().filter(|t| matches(t, criteria)).collect();

    let windowed: Vec<&Task> = filtered
        .iter()
        .copied()
        .filter(|t| t.due_date.is_some_and(|d| contains(window, d)))
        .collect();

    let mut by_day: BTreeMap<NaiveDate, Vec<&Task>> =
        window.days().into_iter().map(|d| (d, Vec::new())).collect();
    for &task in &windowed {
        if view == ViewKind::Calendar && task.status == Status::Completed {
            continue;
        }
        if let Some(bucket) = task.due_date.and_then(|d| by_day.get_mut(&d)) {
            bucket.push(task);
        }
    }

    Projection {
        filtered,
        windowed,
        by_day,
    }
}

impl<'a> Projection<'a> {
    /// Tasks bucketed on `day`, empty for days outside the window.
    pub fn on(&self, day: NaiveDate) -> &[&'a Task] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of pending tasks bucketed on `day`.
    pub fn pending_on(&self, day: NaiveDate) -> usize {
        self.on(day)
            .iter()
            .filter(|t| t.status == Status::Pending)
            .count()
    }

    /// Filtered tasks that are overdue as of `today`.
    pub fn overdue(&self, today: NaiveDate) -> Vec<&'a Task> {
        self.filtered
            .iter()
            .copied()
            .filter(|t| is_overdue(t, today))
            .collect()
    }
}

/// A pending task whose due date is strictly before `today`.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.status == Status::Pending && task.due_date.is_some_and(|d| d < today)
}

/// Stable sort for card lists. Missing due dates sort last.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    match key {
        SortKey::Due => tasks.sort_by(|a, b| cmp_due(a.due_date, b.due_date)),
        SortKey::Priority => tasks.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| cmp_due(a.due_date, b.due_date))
        }),
        SortKey::Created => tasks.sort_by_key(|t| t.created_at),
        SortKey::Title => tasks.sort_by_key(|t| t.title.to_lowercase()),
    }
}

pub(crate) fn cmp_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
