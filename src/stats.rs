//! Aggregate statistics over a snapshot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::dates::{trailing_days, weekday_name, weekday_short};
use crate::fields::{Category, Priority};
use crate::heatmap::{DailyCounts, HeatmapCell};
use crate::task::Task;

/// `round(completed / total * 100)`, and 0 for an empty set.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Completion rate over a list of tasks.
pub fn task_completion_rate(tasks: &[&Task]) -> u32 {
    let done = tasks.iter().filter(|t| t.is_completed()).count();
    completion_rate(done, tasks.len())
}

/// Number of tasks per category. Categories without tasks are left out;
/// unrecognised categories are counted under [`Category::Unknown`].
pub fn category_distribution(tasks: &[&Task]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.category).or_insert(0) += 1;
    }
    counts
}

/// Completed vs. not-yet-completed counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSplit {
    pub completed: usize,
    pub pending: usize,
}

/// Completed/pending split per priority. High, Medium and Low are always present;
/// `Unknown` only appears when some task carries an unrecognised priority.
pub fn priority_breakdown(tasks: &[&Task]) -> BTreeMap<Priority, StatusSplit> {
    let mut breakdown: BTreeMap<Priority, StatusSplit> = Priority::KNOWN
        .iter()
        .map(|p| (*p, StatusSplit::default()))
        .collect();
    for task in tasks {
        let split = breakdown.entry(task.priority).or_default();
        if task.is_completed() {
            split.completed += 1;
        } else {
            split.pending += 1;
        }
    }
    breakdown
}

/// Weekday with the most completions, or no data at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductiveDay {
    Weekday(Weekday),
    NoData,
}

impl fmt::Display for ProductiveDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductiveDay::Weekday(day) => f.write_str(weekday_name(*day)),
            ProductiveDay::NoData => f.write_str("no data"),
        }
    }
}

impl Serialize for ProductiveDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProductiveDay::Weekday(day) => serializer.serialize_some(weekday_name(*day)),
            ProductiveDay::NoData => serializer.serialize_none(),
        }
    }
}

/// Weekday iteration order used for tie-breaking: Monday first.
const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Sum heatmap counts per weekday and pick the largest. Ties go to the earliest
/// weekday in Monday..Sunday order.
pub fn most_productive_day(cells: &[HeatmapCell]) -> ProductiveDay {
    let mut sums = [0u32; 7];
    for cell in cells {
        sums[cell.day.weekday().num_days_from_monday() as usize] += cell.count;
    }

    let mut best: Option<(Weekday, u32)> = None;
    for (weekday, sum) in WEEK_ORDER.iter().zip(sums) {
        if sum == 0 {
            continue;
        }
        if best.map_or(true, |(_, top)| sum > top) {
            best = Some((*weekday, sum));
        }
    }
    best.map_or(ProductiveDay::NoData, |(day, _)| ProductiveDay::Weekday(day))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    /// Short weekday label ("Mon").
    pub label: &'static str,
    pub count: u32,
}

/// The seven days ending today, oldest first, with their completion counts.
pub fn weekly_trend(counts: &DailyCounts, today: NaiveDate) -> Vec<TrendPoint> {
    trailing_days(today, 7)
        .map(|day| TrendPoint {
            day,
            label: weekday_short(day.weekday()),
            count: counts.count(day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use crate::task::RawLabels;
    use crate::heatmap::heatmap;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(priority: Priority, status: Status, category: Category) -> Task {
        Task {
            id: "t".into(),
            title: "t".into(),
            category,
            priority,
            status,
            date: None,
            time_estimate: None,
            created_at: "2024-06-01".into(),
            subtasks: Vec::new(),
            unrecognised: RawLabels::default(),
        }
    }

    #[test]
    fn completion_rate_rounds_and_handles_zero() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(3, 3), 100);
    }

    #[test]
    fn completion_rate_never_drops_when_adding_completed() {
        for pending in 0..20 {
            for done in 0..20 {
                let before = completion_rate(done, done + pending);
                let after = completion_rate(done + 1, done + 1 + pending);
                assert!(after >= before, "{done}/{pending}");
            }
        }
    }

    #[test]
    fn breakdown_zero_fills_known_priorities() {
        let tasks = [
            task(Priority::High, Status::Completed, Category::Work),
            task(Priority::High, Status::Pending, Category::Work),
            task(Priority::Low, Status::Pending, Category::Work),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let expected = BTreeMap::from([
            (Priority::High, StatusSplit { completed: 1, pending: 1 }),
            (Priority::Medium, StatusSplit { completed: 0, pending: 0 }),
            (Priority::Low, StatusSplit { completed: 0, pending: 1 }),
        ]);
        assert_eq!(priority_breakdown(&refs), expected);
    }

    #[test]
    fn breakdown_counts_in_progress_as_pending_and_keeps_unknown() {
        let tasks = [
            task(Priority::Medium, Status::InProgress, Category::Work),
            task(Priority::Unknown, Status::Completed, Category::Work),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let breakdown = priority_breakdown(&refs);
        assert_eq!(breakdown[&Priority::Medium], StatusSplit { completed: 0, pending: 1 });
        assert_eq!(breakdown[&Priority::Unknown], StatusSplit { completed: 1, pending: 0 });
    }

    #[test]
    fn category_distribution_is_sparse() {
        let tasks = [
            task(Priority::Low, Status::Pending, Category::Fitness),
            task(Priority::Low, Status::Pending, Category::Fitness),
            task(Priority::Low, Status::Pending, Category::Unknown),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let expected = BTreeMap::from([(Category::Fitness, 2), (Category::Unknown, 1)]);
        assert_eq!(category_distribution(&refs), expected);
    }

    #[test]
    fn most_productive_day_sums_by_weekday() {
        let today = d(2024, 6, 10);
        // Two Wednesdays (2 + 2) beat one Monday (3).
        let counts = DailyCounts::from_pairs([
            (d(2024, 6, 5), 2),
            (d(2024, 5, 29), 2),
            (d(2024, 6, 10), 3),
        ]);
        let cells = heatmap(&counts, today);
        assert_eq!(most_productive_day(&cells), ProductiveDay::Weekday(Weekday::Wed));
    }

    #[test]
    fn most_productive_day_ties_resolve_monday_first() {
        let counts = DailyCounts::from_pairs([(d(2024, 6, 9), 2), (d(2024, 6, 4), 2)]);
        let cells = heatmap(&counts, d(2024, 6, 10));
        // Sunday and Tuesday tie; Tuesday comes first in Monday..Sunday order.
        assert_eq!(most_productive_day(&cells), ProductiveDay::Weekday(Weekday::Tue));
    }

    #[test]
    fn most_productive_day_reports_no_data() {
        let cells = heatmap(&DailyCounts::default(), d(2024, 6, 10));
        assert_eq!(most_productive_day(&cells), ProductiveDay::NoData);
        assert_eq!(ProductiveDay::NoData.to_string(), "no data");
    }

    #[test]
    fn weekly_trend_is_chronological() {
        let counts = DailyCounts::from_pairs([(d(2024, 6, 10), 4), (d(2024, 6, 4), 1), (d(2024, 6, 3), 9)]);
        let trend = weekly_trend(&counts, d(2024, 6, 10));
        let labels: Vec<_> = trend.iter().map(|p| p.label).collect();
        let values: Vec<_> = trend.iter().map(|p| p.count).collect();
        assert_eq!(labels, ["Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Mon"]);
        assert_eq!(values, [1, 0, 0, 0, 0, 0, 4]);
    }
}
