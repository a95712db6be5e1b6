//! Calendar-day handling and date bucketing.
//!
//! All comparisons happen on [`NaiveDate`] values: stored date strings are truncated
//! to their calendar day before any bucketing so the time of day never changes which
//! bucket a task lands in. "Today" is always passed in by the caller.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::fields::Status;

/// Parse a stored date or date-time string into a wall-clock instant.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive ISO date-times. For offset
/// timestamps the literal date and time written in the string are kept, so
/// `2024-06-10T23:30:00-05:00` stays on June 10th.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a creation timestamp. Unlike [`parse_instant`], offset timestamps are
/// converted to UTC so stamps written with different offsets compare correctly.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(stamp) => Some(stamp.naive_utc()),
        Err(_) => parse_instant(raw),
    }
}

/// Parse a stored date string and truncate it to its calendar day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_instant(raw).map(|stamp| stamp.date())
}

/// The day after `today`.
pub fn tomorrow(today: NaiveDate) -> NaiveDate {
    today + Duration::days(1)
}

/// Calculate the start and end dates of the current ISO week (Monday to Sunday).
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    let end = start + Duration::days(6);
    (start, end)
}

/// Monday to Sunday of the calendar week after the one containing `today`.
pub fn start_end_of_next_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (_, this_end) = start_end_of_this_week(today);
    let start = this_end + Duration::days(1);
    (start, start + Duration::days(6))
}

/// A task is in the backlog when it is not completed and either has no date or
/// its day has already passed.
pub fn is_backlog(status: Status, day: Option<NaiveDate>, today: NaiveDate) -> bool {
    if status.is_completed() {
        return false;
    }
    match day {
        None => true,
        Some(d) => d < today,
    }
}

/// Future horizon groups of the upcoming view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// The day after tomorrow. Tomorrow itself belongs to the tomorrow view.
    Imminent,
    /// Later this week (Monday-based).
    ThisWeek,
    /// The following Monday to Sunday.
    NextWeek,
    Later,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::Imminent,
        Horizon::ThisWeek,
        Horizon::NextWeek,
        Horizon::Later,
    ];

    /// Heading shown above the group.
    pub fn label(self) -> &'static str {
        match self {
            Horizon::Imminent => "Imminent",
            Horizon::ThisWeek => "Rest of This Week",
            Horizon::NextWeek => "Next Week",
            Horizon::Later => "Later",
        }
    }
}

/// Classify a scheduled day into an upcoming horizon. Days on or before tomorrow
/// are not upcoming and yield `None`.
pub fn upcoming_horizon(day: NaiveDate, today: NaiveDate) -> Option<Horizon> {
    let tomorrow = tomorrow(today);
    if day <= tomorrow {
        return None;
    }
    let (_, this_week_end) = start_end_of_this_week(today);
    let (next_week_start, next_week_end) = start_end_of_next_week(today);

    let horizon = if day == tomorrow + Duration::days(1) {
        Horizon::Imminent
    } else if day <= this_week_end {
        Horizon::ThisWeek
    } else if day >= next_week_start && day <= next_week_end {
        Horizon::NextWeek
    } else {
        Horizon::Later
    };
    Some(horizon)
}

/// Grouping key for the history timeline: the scheduled day, falling back to the
/// creation day.
pub fn history_day(day: Option<NaiveDate>, created: Option<NaiveDate>) -> Option<NaiveDate> {
    day.or(created)
}

/// The `days` consecutive days ending at `today`, oldest first.
pub fn trailing_days(today: NaiveDate, days: usize) -> impl Iterator<Item = NaiveDate> {
    let span = days as i64;
    (0..span).map(move |offset| today - Duration::days(span - 1 - offset))
}

/// Full English weekday name ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Three-letter weekday label ("Mon").
pub fn weekday_short(day: Weekday) -> &'static str {
    &weekday_name(day)[..3]
}

/// Human label for a history group: "Today", "Yesterday" or "June 9th, 2024".
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        return "Today".into();
    }
    if day + Duration::days(1) == today {
        return "Yesterday".into();
    }
    format!(
        "{} {}, {}",
        day.format("%B"),
        ordinal(day.day()),
        day.year()
    )
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Format a day relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_day_relative(day: Option<NaiveDate>, today: NaiveDate) -> String {
    match day {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {delta}d")
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday", "next week"
/// - "monday".."sunday" / "mon".."sun" and "next <weekday>"
/// - "end of week", "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_day_input(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = input.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(tomorrow(today)),
        "yesterday" => return Some(today - Duration::days(1)),
        "next week" => return Some(today + Duration::days(7)),
        "end of week" | "eow" => return Some(start_end_of_this_week(today).1),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(n) = rest.strip_suffix('d') {
            if let Ok(days) = n.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(n) = rest.strip_suffix('w') {
            if let Ok(weeks) = n.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        if s == name {
            let ahead = (target + 7 - current) % 7;
            return Some(today + Duration::days(ahead));
        }
        if s == format!("next {name}") {
            let ahead = (target + 7 - current) % 7;
            let days = if ahead == 0 { 7 } else { ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case("2024-06-10", d(2024, 6, 10))]
    #[case("2024-06-10T23:59:59.000Z", d(2024, 6, 10))]
    #[case("2024-06-10T23:30:00-05:00", d(2024, 6, 10))]
    #[case("2024-06-10T08:15:00", d(2024, 6, 10))]
    #[case(" 2024-06-10 ", d(2024, 6, 10))]
    fn truncates_to_calendar_day(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_day(raw), Some(expected));
    }

    #[rstest]
    #[case("10/06/2024")]
    #[case("2024-13-01")]
    #[case("soon")]
    fn rejects_malformed_dates(#[case] raw: &str) {
        assert_eq!(parse_day(raw), None);
    }

    #[test]
    fn backlog_requires_open_and_past_or_undated() {
        let today = d(2024, 6, 10);
        assert!(is_backlog(Status::Pending, Some(d(2024, 6, 9)), today));
        assert!(is_backlog(Status::InProgress, None, today));
        assert!(!is_backlog(Status::Pending, Some(today), today));
        assert!(!is_backlog(Status::Completed, Some(d(2024, 6, 1)), today));
        assert!(!is_backlog(Status::Completed, None, today));
    }

    // 2024-06-10 is a Monday.
    #[rstest]
    #[case(d(2024, 6, 10), None)]
    #[case(d(2024, 6, 11), None)]
    #[case(d(2024, 6, 12), Some(Horizon::Imminent))]
    #[case(d(2024, 6, 13), Some(Horizon::ThisWeek))]
    #[case(d(2024, 6, 16), Some(Horizon::ThisWeek))]
    #[case(d(2024, 6, 17), Some(Horizon::NextWeek))]
    #[case(d(2024, 6, 23), Some(Horizon::NextWeek))]
    #[case(d(2024, 6, 24), Some(Horizon::Later))]
    fn classifies_upcoming_from_monday(#[case] day: NaiveDate, #[case] expected: Option<Horizon>) {
        assert_eq!(upcoming_horizon(day, d(2024, 6, 10)), expected);
    }

    #[test]
    fn imminent_wins_when_week_rolls_over() {
        // Saturday: day after tomorrow is next Monday.
        let saturday = d(2024, 6, 15);
        assert_eq!(upcoming_horizon(d(2024, 6, 17), saturday), Some(Horizon::Imminent));
        assert_eq!(upcoming_horizon(d(2024, 6, 18), saturday), Some(Horizon::NextWeek));
        // Sunday: the whole following week is "next week".
        let sunday = d(2024, 6, 16);
        assert_eq!(upcoming_horizon(d(2024, 6, 19), sunday), Some(Horizon::NextWeek));
        assert_eq!(upcoming_horizon(d(2024, 6, 24), sunday), Some(Horizon::Later));
    }

    #[test]
    fn trailing_days_end_today() {
        let days: Vec<_> = trailing_days(d(2024, 6, 10), 3).collect();
        assert_eq!(days, vec![d(2024, 6, 8), d(2024, 6, 9), d(2024, 6, 10)]);
    }

    #[test]
    fn labels_history_days() {
        let today = d(2024, 6, 10);
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(d(2024, 6, 9), today), "Yesterday");
        assert_eq!(day_label(d(2024, 6, 1), today), "June 1st, 2024");
        assert_eq!(day_label(d(2024, 5, 12), today), "May 12th, 2024");
        assert_eq!(day_label(d(2024, 5, 22), today), "May 22nd, 2024");
    }

    #[test]
    fn parses_relative_input() {
        let today = d(2024, 6, 10);
        assert_eq!(parse_day_input("tomorrow", today), Some(d(2024, 6, 11)));
        assert_eq!(parse_day_input("next week", today), Some(d(2024, 6, 17)));
        assert_eq!(parse_day_input("friday", today), Some(d(2024, 6, 14)));
        assert_eq!(parse_day_input("next monday", today), Some(d(2024, 6, 17)));
        assert_eq!(parse_day_input("in 3d", today), Some(d(2024, 6, 13)));
        assert_eq!(parse_day_input("2024-07-01", today), Some(d(2024, 7, 1)));
        assert_eq!(parse_day_input("someday", today), None);
    }

    #[test]
    fn formats_relative_days() {
        let today = d(2024, 6, 10);
        assert_eq!(format_day_relative(Some(today), today), "today");
        assert_eq!(format_day_relative(Some(d(2024, 6, 13)), today), "in 3d");
        assert_eq!(format_day_relative(Some(d(2024, 6, 8)), today), "2d late");
        assert_eq!(format_day_relative(None, today), "-");
    }
}
