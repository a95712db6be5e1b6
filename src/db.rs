//! JSON file store for tasks.
//!
//! Plays the persistence collaborator for the CLI: it loads a snapshot for the views
//! and executes [`MutationIntent`]s, assigning ids and creation stamps on create.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, StoreError};
use crate::fields::Status;
use crate::mutation::{reconcile, MutationIntent};
use crate::task::{RawLabels, Task};

/// In-memory copy of the task file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
}

impl Database {
    /// Load from a JSON file. A missing or empty file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no task store yet, starting empty");
                return Ok(Database::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Database::default());
        }
        let db: Database = serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), tasks = db.tasks.len(), "loaded task store");
        Ok(db)
    }

    /// Save using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let data = serde_json::to_string_pretty(self).map_err(StoreError::Encode)?;
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(data.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Task with exactly this id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Mutable access to the task with exactly this id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Resolve a task identifier: an exact id, a unique id prefix, or a unique
    /// case-insensitive title.
    pub fn resolve(&self, identifier: &str) -> Result<&Task, String> {
        if let Some(task) = self.get(identifier) {
            return Ok(task);
        }

        let by_prefix: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.id.starts_with(identifier))
            .collect();
        if by_prefix.len() == 1 {
            return Ok(by_prefix[0]);
        }

        let wanted = identifier.to_lowercase();
        let by_title: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == wanted)
            .collect();

        match (by_title.len(), by_prefix.len()) {
            (1, _) => Ok(by_title[0]),
            (0, 0) => Err(format!("No task found matching '{identifier}'")),
            _ => {
                let mut msg = format!("Multiple tasks match '{identifier}':\n");
                for task in by_title.iter().chain(by_prefix.iter()) {
                    msg.push_str(&format!("  {}: {}\n", task.id, task.title));
                }
                msg.push_str("Please use the full ID instead.");
                Err(msg)
            }
        }
    }

    /// Execute an intent and return the id of the affected task.
    pub fn apply(&mut self, intent: MutationIntent, now: DateTime<Utc>) -> Result<String, StoreError> {
        match intent {
            MutationIntent::Create { task } => {
                let id = Uuid::new_v4().to_string();
                let created = reconcile(Task {
                    id: id.clone(),
                    title: task.title,
                    category: task.category,
                    priority: task.priority,
                    status: Status::Pending,
                    date: task.date,
                    time_estimate: task.time_estimate,
                    created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    subtasks: task.subtasks,
                    unrecognised: RawLabels::default(),
                });
                self.tasks.push(created);
                debug!(%id, "created task");
                Ok(id)
            }
            MutationIntent::Update { task_id, changes } => {
                let task = self
                    .get_mut(&task_id)
                    .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;
                changes.apply_to(task);
                *task = reconcile(task.clone());
                debug!(%task_id, "updated task");
                Ok(task_id)
            }
            MutationIntent::Delete { task_id } => {
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != task_id);
                if self.tasks.len() == before {
                    return Err(EngineError::TaskNotFound(task_id).into());
                }
                debug!(%task_id, "deleted task");
                Ok(task_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Category, Priority};
    use crate::mutation::{create, edit, toggle_status, TaskChanges, TaskDraft};
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");

        let mut db = Database::default();
        let mut draft = TaskDraft::new("Write notes", today());
        draft.category = Category::Work;
        draft.priority = Priority::High;
        draft.subtasks = vec!["Outline".into()];
        let id = db.apply(create(draft).unwrap(), now()).unwrap();
        db.save(&path).unwrap();

        let loaded = Database::load(&path).unwrap();
        let task = loaded.get(&id).unwrap();
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.created_at, "2024-06-10T09:30:00.000Z");
        assert_eq!(task.date.as_deref(), Some("2024-06-10"));
        assert_eq!(task.subtasks.len(), 1);
    }

    #[test]
    fn unrecognised_labels_survive_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"{"tasks": [{"id": "odd", "title": "Juggle", "category": "Hobbies",
                "priority": "Urgent", "status": "Blocked", "createdAt": "2024-06-01T08:00:00Z"}]}"#,
        )
        .unwrap();

        let mut db = Database::load(&path).unwrap();
        let rename = TaskChanges {
            title: Some("Juggle three balls".into()),
            ..TaskChanges::default()
        };
        let intent = edit(db.get("odd").unwrap(), &rename).unwrap();
        db.apply(intent, now()).unwrap();
        db.apply(create(TaskDraft::new("Other", today())).unwrap(), now())
            .unwrap();
        db.save(&path).unwrap();

        let after = fs::read_to_string(&path).unwrap();
        for label in ["\"Hobbies\"", "\"Urgent\"", "\"Blocked\""] {
            assert!(after.contains(label), "{label} lost:\n{after}");
        }
        let reloaded = Database::load(&path).unwrap();
        let odd = reloaded.get("odd").unwrap();
        assert_eq!(odd.title, "Juggle three balls");
        assert_eq!(odd.category, Category::Unknown);
        assert_eq!(odd.status, Status::Unknown);
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::load(&dir.path().join("absent.json")).unwrap();
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Database::load(&path), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn applies_update_and_delete() {
        let mut db = Database::default();
        let id = db
            .apply(create(TaskDraft::new("Run", today())).unwrap(), now())
            .unwrap();

        let intent = toggle_status(db.get(&id).unwrap());
        db.apply(intent, now()).unwrap();
        assert_eq!(db.get(&id).unwrap().status, Status::Completed);

        db.apply(MutationIntent::Delete { task_id: id.clone() }, now()).unwrap();
        assert!(db.get(&id).is_none());
        assert!(matches!(
            db.apply(MutationIntent::Delete { task_id: id }, now()),
            Err(StoreError::Engine(EngineError::TaskNotFound(_)))
        ));
    }

    #[test]
    fn resolves_by_prefix_and_title() {
        let mut db = Database::default();
        let id = db
            .apply(create(TaskDraft::new("Read Book", today())).unwrap(), now())
            .unwrap();
        assert_eq!(db.resolve(&id[..8]).unwrap().id, id);
        assert_eq!(db.resolve("read book").unwrap().id, id);
        assert!(db.resolve("nothing").is_err());
    }
}
