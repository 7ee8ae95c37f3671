//! Date parsing and formatting helpers.
//!
//! Task dates are calendar dates with no time-of-day component. Stored values
//! that cannot be read as a date are treated as absent rather than rejected,
//! so a single bad record never takes a whole view down with it.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Parse a stored date value.
///
/// Accepts `YYYY-MM-DD` as well as full timestamps (RFC 3339 or naive
/// `YYYY-MM-DDTHH:MM:SS`), of which only the written calendar date is kept.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let s = input.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Parse a date, logging and discarding it when malformed.
pub fn parse_date_lenient(input: &str) -> Option<NaiveDate> {
    match parse_date(input) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(%e, "ignoring malformed date");
            None
        }
    }
}

/// Serde adapter for optional date fields that tolerates malformed values.
pub mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawDate>::deserialize(deserializer)? {
            None => None,
            Some(RawDate::Text(s)) if s.trim().is_empty() => None,
            Some(RawDate::Text(s)) => parse_date_lenient(&s),
            Some(RawDate::Other(_)) => {
                tracing::warn!("ignoring non-text date value");
                None
            }
        })
    }
}

/// Parse human-readable due date input relative to `today`.
///
/// Supports `today`, `tomorrow`, `yesterday`, `in Nd`, `in Nw`, weekday names
/// (`fri`, `friday`, `this friday`), `next friday` and any stored date format.
pub fn parse_due_input(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = input.trim().to_lowercase();
    let invalid = || Error::InvalidDate {
        input: input.to_string(),
    };

    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return add_days(today, 1).ok_or_else(invalid),
        "yesterday" => return add_days(today, -1).ok_or_else(invalid),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let days = if let Some(n) = rest.strip_suffix('d') {
            n.trim().parse::<i64>().ok()
        } else if let Some(n) = rest.strip_suffix('w') {
            n.trim().parse::<i64>().ok().and_then(|w| w.checked_mul(7))
        } else {
            None
        };
        if let Some(n) = days {
            return add_days(today, n).ok_or_else(invalid);
        }
    }

    let (name, skip_week) = match s.strip_prefix("next ") {
        Some(rest) => (rest, true),
        None => (s.strip_prefix("this ").unwrap_or(s.as_str()), false),
    };
    if let Some(target) = weekday_from_name(name) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target as i64 + 7 - current) % 7;
        let days = if skip_week { ahead + 7 } else { ahead };
        return add_days(today, days).ok_or_else(invalid);
    }

    parse_date(input)
}

/// `date` moved by `days` (negative goes back), or `None` past the calendar's range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn weekday_from_name(name: &str) -> Option<u32> {
    const NAMES: [&str; 7] = [
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ];
    NAMES
        .iter()
        .position(|full| name == *full || (name.len() == 3 && full.starts_with(name)))
        .map(|i| i as u32)
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => match (d - today).num_days() {
            0 => "today".into(),
            1 => "tomorrow".into(),
            n if n > 1 => format!("in {n}d"),
            n => format!("{}d late", -n),
        },
    }
}

/// Format a date as `dd/MM/yyyy`.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_plain_and_timestamp_forms() {
        assert_eq!(parse_date("2024-03-15").unwrap(), d(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T23:30:00-03:00").unwrap(), d(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15T08:00:00").unwrap(), d(2024, 3, 15));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_date("15/03/2024"), Err(Error::InvalidDate { .. })));
        assert!(parse_date_lenient("2024-02-30").is_none());
    }

    #[test]
    fn lenient_field_turns_bad_values_into_none() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient::deserialize")]
            due: Option<NaiveDate>,
        }
        let ok: Row = serde_json::from_str(r#"{"due":"2024-03-15"}"#).unwrap();
        let bad: Row = serde_json::from_str(r#"{"due":"not a date"}"#).unwrap();
        let num: Row = serde_json::from_str(r#"{"due":42}"#).unwrap();
        let missing: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(ok.due, Some(d(2024, 3, 15)));
        assert_eq!(bad.due, None);
        assert_eq!(num.due, None);
        assert_eq!(missing.due, None);
    }

    #[test]
    fn due_input_relative_forms() {
        // 2024-03-13 is a Wednesday.
        let today = d(2024, 3, 13);
        assert_eq!(parse_due_input("today", today).unwrap(), today);
        assert_eq!(parse_due_input("Tomorrow", today).unwrap(), d(2024, 3, 14));
        assert_eq!(parse_due_input("in 3d", today).unwrap(), d(2024, 3, 16));
        assert_eq!(parse_due_input("in 2w", today).unwrap(), d(2024, 3, 27));
        assert_eq!(parse_due_input("fri", today).unwrap(), d(2024, 3, 15));
        assert_eq!(parse_due_input("wednesday", today).unwrap(), today);
        assert_eq!(parse_due_input("next monday", today).unwrap(), d(2024, 3, 25));
        assert_eq!(parse_due_input("2024-12-31", today).unwrap(), d(2024, 12, 31));
        assert!(parse_due_input("someday", today).is_err());
    }

    #[test]
    fn oversized_offsets_are_invalid_not_fatal() {
        let today = d(2024, 3, 13);
        for input in ["in 9999999999999999d", "in -9999999999999999d", "in 9223372036854775807w"] {
            assert!(
                matches!(parse_due_input(input, today), Err(Error::InvalidDate { .. })),
                "{input}"
            );
        }
        assert_eq!(parse_due_input("in -2d", today).unwrap(), d(2024, 3, 11));
        assert!(parse_due_input("tomorrow", NaiveDate::MAX).is_err());
    }

    #[test]
    fn relative_formatting() {
        let today = d(2024, 3, 13);
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(Some(d(2024, 3, 14)), today), "tomorrow");
        assert_eq!(format_due_relative(Some(d(2024, 3, 20)), today), "in 7d");
        assert_eq!(format_due_relative(Some(d(2024, 3, 11)), today), "2d late");
    }
}
