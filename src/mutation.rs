//! Mutation intents and status/subtask reconciliation.
//!
//! The engine never writes. Each operation here inspects a task and describes the
//! change as a [`MutationIntent`] for the store to execute. Update intents always
//! carry the reconciled status and subtasks, so a parent and its checklist can
//! never be persisted out of sync.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::fields::{Category, Priority, Status};
use crate::task::{NewTask, Subtask, Task};

/// A change for the persistence layer to carry out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationIntent {
    Create { task: NewTask },
    Update { task_id: String, changes: TaskChanges },
    Delete { task_id: String },
}

/// Fields to overwrite on an existing task. `None` leaves a field untouched;
/// `date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        *self == TaskChanges::default()
    }

    /// Overwrite the fields present in `self`. Does not reconcile.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(date) = &self.date {
            task.date = date.clone();
        }
        if let Some(minutes) = self.time_estimate {
            task.time_estimate = Some(minutes);
        }
        if let Some(subtasks) = &self.subtasks {
            task.subtasks = subtasks.clone();
        }
    }
}

/// Bring a task's status in line with its subtasks.
///
/// With a non-empty checklist the status follows the items: all done means
/// `Completed`, any open item means `Pending`. Tasks without subtasks are returned
/// unchanged.
pub fn reconcile(mut task: Task) -> Task {
    if task.subtasks.is_empty() {
        return task;
    }
    task.status = if task.subtasks.iter().all(|s| s.completed) {
        Status::Completed
    } else {
        Status::Pending
    };
    task
}

/// Set a new status, checking or unchecking every subtask to match. A task with a
/// checklist then takes the status its items dictate.
fn with_status(task: &Task, status: Status) -> Task {
    let mut next = task.clone();
    next.status = status;
    match status {
        Status::Completed => next.subtasks.iter_mut().for_each(|s| s.completed = true),
        Status::Pending => next.subtasks.iter_mut().for_each(|s| s.completed = false),
        Status::InProgress | Status::Unknown => {}
    }
    reconcile(next)
}

/// Diff two versions of the same task into an update intent.
fn diff(before: &Task, after: &Task) -> MutationIntent {
    let mut changes = TaskChanges::default();
    if before.title != after.title {
        changes.title = Some(after.title.clone());
    }
    if before.category != after.category {
        changes.category = Some(after.category);
    }
    if before.priority != after.priority {
        changes.priority = Some(after.priority);
    }
    if before.status != after.status {
        changes.status = Some(after.status);
    }
    if before.date != after.date {
        changes.date = Some(after.date.clone());
    }
    if before.time_estimate != after.time_estimate {
        changes.time_estimate = after.time_estimate;
    }
    if before.subtasks != after.subtasks {
        changes.subtasks = Some(after.subtasks.clone());
    }
    MutationIntent::Update {
        task_id: before.id.clone(),
        changes,
    }
}

/// Flip between `Completed` and `Pending`, syncing the checklist.
pub fn toggle_status(task: &Task) -> MutationIntent {
    let next = if task.is_completed() {
        Status::Pending
    } else {
        Status::Completed
    };
    set_status(task, next)
}

/// Move a task to `status`, syncing the checklist the same way a toggle does.
pub fn set_status(task: &Task, status: Status) -> MutationIntent {
    diff(task, &with_status(task, status))
}

/// Check or uncheck one subtask and re-derive the parent status.
pub fn toggle_subtask(task: &Task, subtask_id: &str) -> Result<MutationIntent, EngineError> {
    let mut next = task.clone();
    let subtask = next
        .subtasks
        .iter_mut()
        .find(|s| s.id == subtask_id)
        .ok_or_else(|| EngineError::SubtaskNotFound {
            task_id: task.id.clone(),
            subtask_id: subtask_id.to_string(),
        })?;
    subtask.completed = !subtask.completed;
    Ok(diff(task, &reconcile(next)))
}

/// Move a task to another day.
pub fn reschedule(task: &Task, day: NaiveDate) -> MutationIntent {
    let mut next = task.clone();
    next.date = Some(day.format("%Y-%m-%d").to_string());
    diff(task, &next)
}

/// Apply arbitrary field edits, then reconcile.
///
/// An explicit status change syncs the checklist the same way a toggle does; a
/// replaced checklist re-derives the status.
pub fn edit(task: &Task, changes: &TaskChanges) -> Result<MutationIntent, EngineError> {
    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            return Err(EngineError::EmptyTitle);
        }
    }
    let mut next = task.clone();
    changes.apply_to(&mut next);
    let next = match (changes.status, &changes.subtasks) {
        (Some(status), None) => with_status(&next, status),
        _ => reconcile(next),
    };
    Ok(diff(task, &next))
}

/// Remove a task.
pub fn delete(task: &Task) -> MutationIntent {
    MutationIntent::Delete {
        task_id: task.id.clone(),
    }
}

/// Draft of a task to create.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub date: Option<NaiveDate>,
    pub time_estimate: Option<u32>,
    pub subtasks: Vec<String>,
}

impl TaskDraft {
    /// A draft with the defaults of the add form: Learning, Medium, scheduled today.
    pub fn new(title: impl Into<String>, today: NaiveDate) -> Self {
        TaskDraft {
            title: title.into(),
            category: Category::Learning,
            priority: Priority::Medium,
            date: Some(today),
            time_estimate: None,
            subtasks: Vec::new(),
        }
    }
}

/// Validate a draft and describe its creation. Subtasks start unchecked with fresh ids.
pub fn create(draft: TaskDraft) -> Result<MutationIntent, EngineError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(EngineError::EmptyTitle);
    }
    let mut subtasks = Vec::with_capacity(draft.subtasks.len());
    for raw in &draft.subtasks {
        let name = raw.trim();
        if name.is_empty() {
            return Err(EngineError::EmptySubtaskTitle);
        }
        subtasks.push(Subtask {
            id: Uuid::new_v4().to_string(),
            title: name.to_string(),
            completed: false,
        });
    }
    Ok(MutationIntent::Create {
        task: NewTask {
            title: title.to_string(),
            category: draft.category,
            priority: draft.priority,
            date: draft.date.map(|d| d.format("%Y-%m-%d").to_string()),
            time_estimate: draft.time_estimate,
            subtasks,
        },
    })
}
