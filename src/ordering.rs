//! Priority ordering for task lists.

use crate::fields::Priority;
use crate::snapshot::Entry;
use crate::task::Task;

/// Display weight of a priority: High 0, Medium 1, Low 2, anything else 3.
pub fn priority_weight(priority: Priority) -> u8 {
    match priority {
        Priority::High => 0,
        Priority::Medium => 1,
        Priority::Low => 2,
        Priority::Unknown => 3,
    }
}

/// Stable sort by priority weight. Tasks of equal priority keep their input order,
/// so a preceding ordering (e.g. newest first) survives as the tiebreaker.
pub fn sort_by_priority(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| priority_weight(t.priority));
}

/// Newest-created first, the base ordering the store hands out. Entries whose
/// `createdAt` could not be read go last.
pub fn sort_newest_first(entries: &mut [&Entry<'_>]) {
    entries.sort_by(|a, b| b.created.cmp(&a.created));
}
