//! Named views assembled from a snapshot and the current day.
//!
//! Every function here is pure: the same snapshot and day always produce the same
//! view, and an empty snapshot produces an empty-but-valid view.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::dates::{self, day_label, history_day, is_backlog, upcoming_horizon, Horizon};
use crate::fields::{Category, Priority};
use crate::heatmap::{current_streak, heatmap, DailyCounts, HeatmapCell};
use crate::ordering::{sort_by_priority, sort_newest_first};
use crate::snapshot::{Entry, Snapshot};
use crate::stats::{
    category_distribution, completion_rate, most_productive_day, priority_breakdown,
    task_completion_rate, weekly_trend, ProductiveDay, StatusSplit, TrendPoint,
};
use crate::task::Task;

/// Today's focus list and headline numbers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<'a> {
    pub today: NaiveDate,
    /// Tasks scheduled today, highest priority first.
    pub tasks: Vec<&'a Task>,
    pub completed: usize,
    pub total: usize,
    pub completion_rate: u32,
    /// Estimated minutes of today's unfinished tasks.
    pub planned_minutes: u32,
    pub streak: u32,
    pub weekly_trend: Vec<TrendPoint>,
}

/// Tasks scheduled on one specific day, highest priority first.
#[derive(Debug, Clone, Serialize)]
pub struct DayPlan<'a> {
    pub day: NaiveDate,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacklogItem<'a> {
    pub task: &'a Task,
    pub day: Option<NaiveDate>,
    /// Whole days past the scheduled day; `None` for undated tasks.
    pub days_overdue: Option<i64>,
}

/// Unfinished tasks that are overdue or have no date. Undated tasks come first,
/// then the oldest scheduled day.
#[derive(Debug, Clone, Serialize)]
pub struct BacklogView<'a> {
    pub items: Vec<BacklogItem<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryGroup<'a> {
    pub day: NaiveDate,
    pub label: String,
    pub tasks: Vec<&'a Task>,
}

/// Completed tasks grouped by day, newest day first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView<'a> {
    pub total: usize,
    pub groups: Vec<HistoryGroup<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HorizonGroup<'a> {
    pub horizon: Horizon,
    pub tasks: Vec<&'a Task>,
}

/// Unfinished tasks dated after tomorrow, split into horizons. All four horizons
/// are always present, in [`Horizon::ALL`] order.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingView<'a> {
    pub total: usize,
    pub groups: Vec<HorizonGroup<'a>>,
}

impl<'a> UpcomingView<'a> {
    /// Tasks in one horizon, empty when the horizon has none.
    pub fn group(&self, horizon: Horizon) -> &[&'a Task] {
        self.groups
            .iter()
            .find(|g| g.horizon == horizon)
            .map(|g| g.tasks.as_slice())
            .unwrap_or(&[])
    }
}

/// Productivity analytics over the whole snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    pub category_distribution: BTreeMap<Category, usize>,
    pub priority_breakdown: BTreeMap<Priority, StatusSplit>,
    pub most_productive_day: ProductiveDay,
    pub streak: u32,
    /// Days with at least one completion.
    pub days_tracked: usize,
    /// Completions attributed to a day.
    pub total_completions: u32,
    pub heatmap: Vec<HeatmapCell>,
    pub weekly_trend: Vec<TrendPoint>,
}

fn tasks_on<'a>(snapshot: &Snapshot<'a>, day: NaiveDate) -> Vec<&'a Task> {
    let mut entries: Vec<&Entry<'a>> = snapshot
        .entries()
        .iter()
        .filter(|e| e.day() == Some(day))
        .collect();
    sort_newest_first(&mut entries);
    let mut tasks: Vec<&'a Task> = entries.into_iter().map(|e| e.task).collect();
    sort_by_priority(&mut tasks);
    tasks
}

/// Today's tasks with completion rate, planned minutes, streak and weekly trend.
pub fn dashboard<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> DashboardView<'a> {
    let tasks = tasks_on(snapshot, today);
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    let planned_minutes: u32 = tasks
        .iter()
        .filter(|t| !t.is_completed())
        .filter_map(|t| t.time_estimate)
        .sum();
    let counts = DailyCounts::from_snapshot(snapshot);

    debug!(tasks = tasks.len(), completed, "assembled dashboard");
    DashboardView {
        today,
        completed,
        total: tasks.len(),
        completion_rate: completion_rate(completed, tasks.len()),
        planned_minutes,
        streak: current_streak(&counts, today),
        weekly_trend: weekly_trend(&counts, today),
        tasks,
    }
}

/// Everything scheduled for exactly tomorrow.
pub fn tomorrow<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> DayPlan<'a> {
    let day = dates::tomorrow(today);
    DayPlan {
        day,
        tasks: tasks_on(snapshot, day),
    }
}

/// Unfinished tasks that are overdue or undated, undated first, then oldest day.
pub fn backlog<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> BacklogView<'a> {
    let mut entries: Vec<&Entry<'a>> = snapshot
        .entries()
        .iter()
        .filter(|e| is_backlog(e.task.status, e.day(), today))
        .collect();
    // `None` orders before any `Some`, putting undated tasks first.
    entries.sort_by_key(|e| e.scheduled);

    let items = entries
        .into_iter()
        .map(|e| {
            let day = e.day();
            BacklogItem {
                task: e.task,
                day,
                days_overdue: day.map(|d| (today - d).num_days()),
            }
        })
        .collect::<Vec<_>>();
    debug!(items = items.len(), "assembled backlog");
    BacklogView { items }
}

/// Completed tasks grouped by their scheduled day, or their creation day when
/// undated. Newest day first; within a day, latest first.
pub fn history<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> HistoryView<'a> {
    let mut done: Vec<&Entry<'a>> = snapshot
        .entries()
        .iter()
        .filter(|e| e.task.is_completed())
        .collect();
    done.sort_by(|a, b| b.timeline_instant().cmp(&a.timeline_instant()));

    let mut by_day: BTreeMap<NaiveDate, Vec<&'a Task>> = BTreeMap::new();
    let mut total = 0;
    for entry in done {
        // Neither date nor createdAt readable; already reported by the snapshot.
        let Some(day) = history_day(entry.day(), entry.created_day()) else {
            continue;
        };
        by_day.entry(day).or_default().push(entry.task);
        total += 1;
    }

    let groups = by_day
        .into_iter()
        .rev()
        .map(|(day, tasks)| HistoryGroup {
            day,
            label: day_label(day, today),
            tasks,
        })
        .collect();
    HistoryView { total, groups }
}

fn upcoming_entries<'a, 'b>(
    snapshot: &'b Snapshot<'a>,
    today: NaiveDate,
) -> Vec<(&'b Entry<'a>, NaiveDate, Horizon)> {
    let mut entries: Vec<_> = snapshot
        .entries()
        .iter()
        .filter(|e| !e.task.is_completed())
        .filter_map(|e| {
            let day = e.day()?;
            upcoming_horizon(day, today).map(|h| (e, day, h))
        })
        .collect();
    entries.sort_by_key(|(e, _, _)| e.scheduled);
    entries
}

/// Unfinished tasks dated after tomorrow, split into the four horizons.
pub fn upcoming<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> UpcomingView<'a> {
    let entries = upcoming_entries(snapshot, today);
    let groups = Horizon::ALL
        .iter()
        .map(|horizon| HorizonGroup {
            horizon: *horizon,
            tasks: entries
                .iter()
                .filter(|(_, _, h)| h == horizon)
                .map(|(e, _, _)| e.task)
                .collect(),
        })
        .collect();
    UpcomingView {
        total: entries.len(),
        groups,
    }
}

/// The same tasks as [`upcoming`], grouped per day in ascending order.
pub fn upcoming_by_day<'a>(snapshot: &Snapshot<'a>, today: NaiveDate) -> Vec<DayPlan<'a>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&'a Task>> = BTreeMap::new();
    for (entry, day, _) in upcoming_entries(snapshot, today) {
        by_day.entry(day).or_default().push(entry.task);
    }
    by_day
        .into_iter()
        .map(|(day, tasks)| DayPlan { day, tasks })
        .collect()
}

/// Whole-snapshot statistics plus the trailing-year heatmap.
pub fn analytics(snapshot: &Snapshot<'_>, today: NaiveDate) -> AnalyticsView {
    let tasks = snapshot.tasks();
    let counts = DailyCounts::from_snapshot(snapshot);
    let cells = heatmap(&counts, today);

    debug!(tasks = tasks.len(), days = counts.days_tracked(), "assembled analytics");
    AnalyticsView {
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.is_completed()).count(),
        completion_rate: task_completion_rate(tasks),
        category_distribution: category_distribution(tasks),
        priority_breakdown: priority_breakdown(tasks),
        most_productive_day: most_productive_day(&cells),
        streak: current_streak(&counts, today),
        days_tracked: counts.days_tracked(),
        total_completions: counts.total(),
        heatmap: cells,
        weekly_trend: weekly_trend(&counts, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use crate::task::RawLabels;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: &str, date: Option<&str>, status: Status, priority: Priority) -> Task {
        Task {
            id: id.into(),
            title: id.into(),
            category: Category::Work,
            priority,
            status,
            date: date.map(str::to_string),
            time_estimate: Some(15),
            created_at: "2024-06-01T09:00:00Z".into(),
            subtasks: Vec::new(),
            unrecognised: RawLabels::default(),
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn dashboard_counts_only_today() {
        let tasks = vec![
            task("low", Some("2024-06-10"), Status::Pending, Priority::Low),
            task("high", Some("2024-06-10T18:00:00Z"), Status::Completed, Priority::High),
            task("other", Some("2024-06-11"), Status::Pending, Priority::High),
        ];
        let snapshot = Snapshot::new(&tasks);
        let view = dashboard(&snapshot, d(2024, 6, 10));
        assert_eq!(ids(&view.tasks), ["high", "low"]);
        assert_eq!((view.completed, view.total, view.completion_rate), (1, 2, 50));
        assert_eq!(view.planned_minutes, 15);
        assert_eq!(view.streak, 1);
        assert_eq!(view.weekly_trend.last().map(|p| p.count), Some(1));
    }

    #[test]
    fn backlog_puts_undated_first_then_oldest() {
        let tasks = vec![
            task("recent", Some("2024-06-09"), Status::Pending, Priority::Low),
            task("undated", None, Status::InProgress, Priority::Low),
            task("old", Some("2024-05-01"), Status::Pending, Priority::Low),
            task("done", Some("2024-05-01"), Status::Completed, Priority::Low),
            task("today", Some("2024-06-10"), Status::Pending, Priority::Low),
        ];
        let snapshot = Snapshot::new(&tasks);
        let view = backlog(&snapshot, d(2024, 6, 10));
        let order: Vec<_> = view.items.iter().map(|i| i.task.id.as_str()).collect();
        assert_eq!(order, ["undated", "old", "recent"]);
        assert_eq!(view.items[1].days_overdue, Some(40));
        assert_eq!(view.items[0].days_overdue, None);
    }

    #[test]
    fn history_groups_by_day_descending() {
        let mut undated = task("undated", None, Status::Completed, Priority::Low);
        undated.created_at = "2024-06-08T22:00:00Z".into();
        let tasks = vec![
            task("morning", Some("2024-06-09T08:00:00"), Status::Completed, Priority::Low),
            task("evening", Some("2024-06-09T20:00:00"), Status::Completed, Priority::Low),
            undated,
            task("open", Some("2024-06-09"), Status::Pending, Priority::Low),
        ];
        let snapshot = Snapshot::new(&tasks);
        let view = history(&snapshot, d(2024, 6, 10));
        assert_eq!(view.total, 3);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.groups[0].day, d(2024, 6, 9));
        assert_eq!(view.groups[0].label, "Yesterday");
        assert_eq!(ids(&view.groups[0].tasks), ["evening", "morning"]);
        assert_eq!(ids(&view.groups[1].tasks), ["undated"]);
    }

    #[test]
    fn upcoming_excludes_tomorrow_and_sorts_within_groups() {
        let tasks = vec![
            task("tomorrow", Some("2024-06-11"), Status::Pending, Priority::High),
            task("fri", Some("2024-06-14"), Status::Pending, Priority::Low),
            task("wed", Some("2024-06-12"), Status::Pending, Priority::Low),
            task("thu", Some("2024-06-13"), Status::Pending, Priority::Low),
            task("done", Some("2024-06-13"), Status::Completed, Priority::Low),
            task("far", Some("2024-08-01"), Status::Pending, Priority::Low),
        ];
        let snapshot = Snapshot::new(&tasks);
        let today = d(2024, 6, 10);
        let view = upcoming(&snapshot, today);
        assert_eq!(view.total, 4);
        assert_eq!(ids(view.group(Horizon::Imminent)), ["wed"]);
        assert_eq!(ids(view.group(Horizon::ThisWeek)), ["thu", "fri"]);
        assert!(view.group(Horizon::NextWeek).is_empty());
        assert_eq!(ids(view.group(Horizon::Later)), ["far"]);

        let plan = tomorrow(&snapshot, today);
        assert_eq!(ids(&plan.tasks), ["tomorrow"]);

        let days: Vec<_> = upcoming_by_day(&snapshot, today).iter().map(|p| p.day).collect();
        assert_eq!(days, [d(2024, 6, 12), d(2024, 6, 13), d(2024, 6, 14), d(2024, 8, 1)]);
    }

    #[test]
    fn analytics_totals() {
        let tasks = vec![
            task("a", Some("2024-06-09"), Status::Completed, Priority::High),
            task("b", Some("2024-06-09"), Status::Completed, Priority::Low),
            task("c", None, Status::Completed, Priority::Low),
            task("d", Some("2024-06-10"), Status::Pending, Priority::Medium),
        ];
        let snapshot = Snapshot::new(&tasks);
        let view = analytics(&snapshot, d(2024, 6, 10));
        assert_eq!(view.total_tasks, 4);
        assert_eq!(view.completed_tasks, 3);
        assert_eq!(view.completion_rate, 75);
        assert_eq!(view.days_tracked, 1);
        assert_eq!(view.total_completions, 2);
        assert_eq!(view.streak, 1);
        assert_eq!(view.category_distribution, BTreeMap::from([(Category::Work, 4)]));
        assert_eq!(
            view.most_productive_day,
            ProductiveDay::Weekday(chrono::Weekday::Sun)
        );
    }
}
