//! A task list resolved against the calendar.
//!
//! Building a [`Snapshot`] parses every task's `date` and `createdAt` exactly once.
//! Records with unreadable dates are reported as issues and left out of date-based
//! computations only; they still count towards totals and distributions.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::dates::{parse_instant, parse_timestamp};
use crate::error::EngineError;
use crate::task::Task;

/// One task with its dates resolved.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub task: &'a Task,
    /// Scheduled instant; `None` when the task has no date.
    pub scheduled: Option<NaiveDateTime>,
    /// Creation instant in UTC; `None` when `createdAt` could not be read.
    pub created: Option<NaiveDateTime>,
}

impl Entry<'_> {
    /// Scheduled calendar day.
    pub fn day(&self) -> Option<NaiveDate> {
        self.scheduled.map(|s| s.date())
    }

    pub fn created_day(&self) -> Option<NaiveDate> {
        self.created.map(|c| c.date())
    }

    /// Scheduled instant, falling back to creation.
    pub fn timeline_instant(&self) -> Option<NaiveDateTime> {
        self.scheduled.or(self.created)
    }
}

/// Point-in-time task list handed in by the caller.
#[derive(Debug, Clone, Default)]
pub struct Snapshot<'a> {
    tasks: Vec<&'a Task>,
    entries: Vec<Entry<'a>>,
    issues: Vec<EngineError>,
}

impl<'a> Snapshot<'a> {
    /// Resolve the dates of every task, recording unreadable ones as issues.
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut snapshot = Snapshot::default();
        for task in tasks {
            snapshot.tasks.push(task);

            let scheduled = match task.raw_date() {
                None => None,
                Some(raw) => match parse_instant(raw) {
                    Some(stamp) => Some(stamp),
                    None => {
                        snapshot.report(EngineError::InvalidDate {
                            task_id: task.id.clone(),
                            field: "date",
                            value: raw.to_string(),
                        });
                        continue;
                    }
                },
            };

            let created = parse_timestamp(&task.created_at);
            if created.is_none() {
                snapshot.report(EngineError::InvalidDate {
                    task_id: task.id.clone(),
                    field: "createdAt",
                    value: task.created_at.clone(),
                });
            }

            snapshot.entries.push(Entry {
                task,
                scheduled,
                created,
            });
        }
        snapshot
    }

    fn report(&mut self, issue: EngineError) {
        warn!(%issue, "skipping record in date-based views");
        self.issues.push(issue);
    }

    /// Every task in input order, including those with unreadable dates.
    pub fn tasks(&self) -> &[&'a Task] {
        &self.tasks
    }

    /// Tasks whose `date` is absent or readable, in input order.
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    /// Per-record problems found while resolving dates.
    pub fn issues(&self) -> &[EngineError] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
