//! Daily completion counts, the trailing-year heatmap and the current streak.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::dates::trailing_days;
use crate::snapshot::Snapshot;

/// Length of the heatmap window, ending today.
pub const HEATMAP_DAYS: usize = 365;

/// Number of completed tasks per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyCounts(BTreeMap<NaiveDate, u32>);

impl DailyCounts {
    /// Build from `(day, count)` pairs. Repeated days are summed.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, u32)>,
    {
        let mut counts = BTreeMap::new();
        for (day, count) in pairs {
            *counts.entry(day).or_insert(0) += count;
        }
        DailyCounts(counts)
    }

    /// Count completed tasks by their scheduled day. Completed tasks without a date
    /// (or with an unreadable one) are not attributed to any day.
    pub fn from_snapshot(snapshot: &Snapshot<'_>) -> Self {
        Self::from_pairs(
            snapshot
                .entries()
                .iter()
                .filter(|e| e.task.is_completed())
                .filter_map(|e| e.day())
                .map(|day| (day, 1)),
        )
    }

    /// Completions on `day`, 0 when none were recorded.
    pub fn count(&self, day: NaiveDate) -> u32 {
        self.0.get(&day).copied().unwrap_or(0)
    }

    /// Completions across all days.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Days with at least one completion.
    pub fn days_tracked(&self) -> usize {
        self.0.values().filter(|c| **c > 0).count()
    }
}

/// Display intensity bucket for a heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 0
    Empty,
    /// 1-2
    Light,
    /// 3-4
    Moderate,
    /// 5-6
    Busy,
    /// 7-8
    Intense,
    /// 9+
    Peak,
}

impl Tier {
    /// Bucket a daily count into its display tier.
    pub fn for_count(count: u32) -> Self {
        match count {
            0 => Tier::Empty,
            1..=2 => Tier::Light,
            3..=4 => Tier::Moderate,
            5..=6 => Tier::Busy,
            7..=8 => Tier::Intense,
            _ => Tier::Peak,
        }
    }

    /// Single character used when drawing the heatmap in a terminal.
    pub fn glyph(self) -> char {
        match self {
            Tier::Empty => '.',
            Tier::Light => '░',
            Tier::Moderate => '▒',
            Tier::Busy => '▓',
            Tier::Intense => '█',
            Tier::Peak => '#',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub day: NaiveDate,
    pub count: u32,
    pub tier: Tier,
}

/// One cell per day for the [`HEATMAP_DAYS`] days ending `today`, oldest first.
pub fn heatmap(counts: &DailyCounts, today: NaiveDate) -> Vec<HeatmapCell> {
    trailing_days(today, HEATMAP_DAYS)
        .map(|day| {
            let count = counts.count(day);
            HeatmapCell {
                day,
                count,
                tier: Tier::for_count(count),
            }
        })
        .collect()
}

/// Consecutive days with at least one completion, counted backwards.
///
/// Counting starts today when today already has a completion, otherwise yesterday:
/// an idle today does not break the streak until it is over.
pub fn current_streak(counts: &DailyCounts, today: NaiveDate) -> u32 {
    let mut cursor = if counts.count(today) > 0 {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while counts.count(cursor) > 0 {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}
