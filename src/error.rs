//! Error types.
//!
//! The engine itself only fails per record or per requested mutation; views never
//! return an error. Store and configuration errors belong to the adapters around it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the engine for a single record or mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A date field could not be read as a calendar day.
    #[error("task {task_id}: invalid {field} value {value:?}")]
    InvalidDate {
        task_id: String,
        field: &'static str,
        value: String,
    },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task {task_id} has no subtask {subtask_id}")]
    SubtaskNotFound { task_id: String, subtask_id: String },

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("subtask title must not be empty")]
    EmptySubtaskTitle,
}

/// Errors raised by the JSON task store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse task store {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode task store: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}
