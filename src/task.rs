//! Task records as handed over by the persistence layer.
//!
//! Field names follow the store's camelCase JSON. Dates are kept as the raw strings the
//! store holds; they are only interpreted (and truncated to a calendar day) when a
//! [`Snapshot`](crate::snapshot::Snapshot) is built.

use serde::{Deserialize, Serialize};

use crate::fields::{Category, Priority, Status};

/// A checklist item owned by exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Original store text of enum fields that did not match a known value.
///
/// Those fields read as `Unknown`; keeping the text lets a save write the record back
/// exactly as it was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLabels {
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

/// A unit of work scheduled on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    /// ISO date or date-time. Absent or blank means "no fixed date".
    pub date: Option<String>,
    /// Estimated effort in minutes.
    pub time_estimate: Option<u32>,
    pub created_at: String,
    pub subtasks: Vec<Subtask>,
    pub unrecognised: RawLabels,
}

/// Wire shape of a [`Task`] in the store's camelCase JSON.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_estimate: Option<u32>,
    created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subtasks: Vec<Subtask>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let category = record.category.as_deref().map_or(Category::Unknown, Category::parse);
        let priority = record.priority.as_deref().map_or(Priority::Unknown, Priority::parse);
        let status = record.status.as_deref().map_or(Status::Unknown, Status::parse);
        Task {
            id: record.id,
            title: record.title,
            category,
            priority,
            status,
            date: record.date,
            time_estimate: record.time_estimate,
            created_at: record.created_at,
            subtasks: record.subtasks,
            unrecognised: RawLabels {
                category: record.category.filter(|_| category == Category::Unknown),
                priority: record.priority.filter(|_| priority == Priority::Unknown),
                status: record.status.filter(|_| status == Status::Unknown),
            },
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let raw = task.unrecognised;
        TaskRecord {
            category: match task.category {
                Category::Unknown => raw.category,
                known => Some(known.label().to_string()),
            },
            priority: match task.priority {
                Priority::Unknown => raw.priority,
                known => Some(known.label().to_string()),
            },
            status: match task.status {
                Status::Unknown => raw.status,
                known => Some(known.label().to_string()),
            },
            id: task.id,
            title: task.title,
            date: task.date,
            time_estimate: task.time_estimate,
            created_at: task.created_at,
            subtasks: task.subtasks,
        }
    }
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// The raw date string, treating blank values as absent.
    pub fn raw_date(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Subtask with exactly this id.
    pub fn subtask(&self, id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == id)
    }

    /// `(completed, total)` subtask counts.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}

/// Fields for a task that does not exist yet. The store assigns `id`, `createdAt`
/// and the initial `Pending` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
}
