//! Seven-day week windows.
//!
//! A window is aligned to the configured first weekday only when it is first
//! created from "today". Navigation then moves both bounds by exactly seven
//! calendar days and never re-aligns, so a window built from an arbitrary
//! anchor keeps that anchor's weekday for as long as the user pages through
//! weeks. All arithmetic is on `NaiveDate`, which has no clock and no DST.

use chrono::{Datelike, Days, NaiveDate};

use crate::dates;
use crate::fields::WeekStart;

/// A 7-calendar-day span, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Window starting on `start` exactly, without alignment.
    ///
    /// Falls back to a window ending on `start` at the very end of the
    /// representable calendar.
    pub fn starting(start: NaiveDate) -> Self {
        match start.checked_add_days(Days::new(6)) {
            Some(end) => WeekWindow { start, end },
            None => WeekWindow {
                start: start - Days::new(6),
                end: start,
            },
        }
    }

    /// The seven dates of the window, in order.
    pub fn days(&self) -> [NaiveDate; 7] {
        let mut out = [self.start; 7];
        for (offset, day) in out.iter_mut().enumerate().skip(1) {
            *day = self.start + Days::new(offset as u64);
        }
        out
    }

    /// `dd/MM – dd/MM/yyyy`, as shown above the calendar.
    pub fn label(&self) -> String {
        format!("{} – {}", self.start.format("%d/%m"), self.end.format("%d/%m/%Y"))
    }
}

/// The window containing `today`, starting on the configured first weekday.
pub fn initial_window(today: NaiveDate, week_start: WeekStart) -> WeekWindow {
    let back = match week_start {
        WeekStart::Monday => today.weekday().num_days_from_monday(),
        WeekStart::Sunday => today.weekday().num_days_from_sunday(),
    };
    let start = today
        .checked_sub_days(Days::new(back as u64))
        .unwrap_or(today);
    WeekWindow::starting(start)
}

/// The following week.
pub fn next_week(current: &WeekWindow) -> WeekWindow {
    match (
        current.start.checked_add_days(Days::new(7)),
        current.end.checked_add_days(Days::new(7)),
    ) {
        (Some(start), Some(end)) => WeekWindow { start, end },
        _ => {
            tracing::warn!(start = %current.start, "cannot move past the last representable week");
            *current
        }
    }
}

/// The preceding week.
pub fn previous_week(current: &WeekWindow) -> WeekWindow {
    match (
        current.start.checked_sub_days(Days::new(7)),
        current.end.checked_sub_days(Days::new(7)),
    ) {
        (Some(start), Some(end)) => WeekWindow { start, end },
        _ => {
            tracing::warn!(start = %current.start, "cannot move before the first representable week");
            *current
        }
    }
}

/// Move `weeks` weeks forward (positive) or back (negative) in one step.
pub fn shift_weeks(current: &WeekWindow, weeks: i64) -> WeekWindow {
    let shifted = weeks.checked_mul(7).and_then(|days| {
        Some(WeekWindow {
            start: dates::add_days(current.start, days)?,
            end: dates::add_days(current.end, days)?,
        })
    });
    shifted.unwrap_or_else(|| {
        tracing::warn!(start = %current.start, weeks, "week offset leaves the representable calendar");
        *current
    })
}

/// Whether `date` falls inside the window, bounds included.
pub fn contains(window: &WeekWindow, date: NaiveDate) -> bool {
    window.start <= date && date <= window.end
}

/// Window for a user-supplied anchor.
///
/// A valid anchor becomes the window start as given. A missing or malformed
/// anchor falls back to the aligned window around `today`.
pub fn parse_anchor(input: Option<&str>, today: NaiveDate, week_start: WeekStart) -> WeekWindow {
    match input.map(dates::parse_date) {
        Some(Ok(start)) => WeekWindow::starting(start),
        Some(Err(e)) => {
            tracing::warn!(%e, "using the current week instead");
            initial_window(today, week_start)
        }
        None => initial_window(today, week_start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn initial_window_rounds_down_to_monday() {
        // 2024-03-13 is a Wednesday.
        let w = initial_window(d(2024, 3, 13), WeekStart::Monday);
        assert_eq!(w.start, d(2024, 3, 11));
        assert_eq!(w.end, d(2024, 3, 17));
        assert_eq!(w.start.weekday(), Weekday::Mon);

        let on_monday = initial_window(d(2024, 3, 11), WeekStart::Monday);
        assert_eq!(on_monday, w);
    }

    #[test]
    fn initial_window_can_start_on_sunday() {
        let w = initial_window(d(2024, 3, 13), WeekStart::Sunday);
        assert_eq!(w.start, d(2024, 3, 10));
        assert_eq!(w.end, d(2024, 3, 16));
        let on_sunday = initial_window(d(2024, 3, 17), WeekStart::Sunday);
        assert_eq!(on_sunday.start, d(2024, 3, 17));
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = WeekWindow::starting(d(2024, 3, 11));
        assert!(contains(&w, w.start));
        assert!(contains(&w, w.end));
        assert!(!contains(&w, d(2024, 3, 10)));
        assert!(!contains(&w, d(2024, 3, 18)));
    }

    #[test]
    fn navigation_crosses_month_and_year() {
        let w = WeekWindow::starting(d(2024, 12, 30));
        assert_eq!(w.end, d(2025, 1, 5));
        let next = next_week(&w);
        assert_eq!(next.start, d(2025, 1, 6));
        let back = previous_week(&WeekWindow::starting(d(2024, 3, 4)));
        assert_eq!(back.start, d(2024, 2, 26));
        assert_eq!(back.end, d(2024, 3, 3));
    }

    #[test]
    fn navigation_spans_dst_changes_in_whole_days() {
        // Weeks containing the 2024 European and US clock changes.
        for start in [d(2024, 3, 25), d(2024, 3, 4), d(2024, 10, 28), d(2024, 11, 4)] {
            let w = WeekWindow::starting(start);
            assert_eq!((next_week(&w).start - w.start).num_days(), 7);
            assert_eq!((w.end - w.start).num_days(), 6);
        }
    }

    #[test]
    fn navigation_does_not_realign_an_unaligned_anchor() {
        // Thursday anchor stays a Thursday anchor.
        let w = parse_anchor(Some("2024-03-14"), d(2024, 1, 1), WeekStart::Monday);
        assert_eq!(w.start.weekday(), Weekday::Thu);
        let moved = next_week(&next_week(&w));
        assert_eq!(moved.start, d(2024, 3, 28));
        assert_eq!(moved.start.weekday(), Weekday::Thu);
        assert_eq!(previous_week(&w).start, d(2024, 3, 7));
    }

    #[test]
    fn bad_anchor_falls_back_to_today() {
        let today = d(2024, 3, 13);
        let w = parse_anchor(Some("tomorrow-ish"), today, WeekStart::Monday);
        assert_eq!(w, initial_window(today, WeekStart::Monday));
        assert_eq!(parse_anchor(None, today, WeekStart::Monday), w);
    }

    #[test]
    fn shift_weeks_moves_in_either_direction() {
        let w = WeekWindow::starting(d(2024, 3, 11));
        assert_eq!(shift_weeks(&w, 2).start, d(2024, 3, 25));
        assert_eq!(shift_weeks(&w, -1).start, d(2024, 3, 4));
        assert_eq!(shift_weeks(&w, 0), w);
        assert_eq!(shift_weeks(&w, 52), shift_weeks(&shift_weeks(&w, 50), 2));
    }

    #[test]
    fn huge_offsets_leave_the_window_unchanged() {
        let w = WeekWindow::starting(d(2024, 3, 11));
        let started = std::time::Instant::now();
        assert_eq!(shift_weeks(&w, i64::MAX), w);
        assert_eq!(shift_weeks(&w, i64::MIN), w);
        assert_eq!(shift_weeks(&w, 20_000_000), w);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn days_and_label() {
        let w = WeekWindow::starting(d(2024, 3, 11));
        let days = w.days();
        assert_eq!(days[0], d(2024, 3, 11));
        assert_eq!(days[6], d(2024, 3, 17));
        assert_eq!(w.label(), "11/03 – 17/03/2024");
    }

    #[test]
    fn saturates_at_the_end_of_the_calendar() {
        let w = WeekWindow::starting(NaiveDate::MAX);
        assert_eq!(w.end, NaiveDate::MAX);
        assert_eq!(next_week(&w), w);
    }

    proptest! {
        #[test]
        fn next_undoes_previous(offset in -200_000i64..200_000) {
            let start = d(2000, 1, 1) + chrono::Duration::days(offset);
            let w = WeekWindow::starting(start);
            prop_assert_eq!(next_week(&previous_week(&w)), w);
            prop_assert_eq!(previous_week(&next_week(&w)), w);
        }

        #[test]
        fn window_edges(offset in -200_000i64..200_000) {
            let w = initial_window(d(2000, 1, 1) + chrono::Duration::days(offset), WeekStart::Monday);
            prop_assert!(contains(&w, w.start));
            prop_assert!(contains(&w, w.end));
            prop_assert!(!contains(&w, w.start.pred_opt().unwrap()));
            prop_assert!(!contains(&w, w.end.succ_opt().unwrap()));
            prop_assert_eq!((w.end - w.start).num_days(), 6);
        }
    }
}
