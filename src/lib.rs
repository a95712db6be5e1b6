//! # taskpulse
//!
//! Temporal task aggregation and analytics for a personal productivity dashboard.
//!
//! The engine takes a flat list of [`Task`](task::Task) records plus "today" and
//! derives every view from them: today's focus list, tomorrow's plan, the backlog,
//! future horizons, the completed-task timeline, and analytics such as the
//! consistency heatmap, streak and weekly trend. It never stores anything; changes
//! are described as [`MutationIntent`](mutation::MutationIntent)s for a store to execute.
//!
//! ```
//! use chrono::NaiveDate;
//! use taskpulse::{snapshot::Snapshot, task::Task, views};
//!
//! let tasks: Vec<Task> = serde_json::from_str(r#"[
//!     {"id": "1", "title": "Run", "category": "Fitness", "priority": "High",
//!      "status": "Completed", "date": "2024-06-10", "createdAt": "2024-06-09T08:00:00Z"}
//! ]"#).unwrap();
//! let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
//! let view = views::dashboard(&Snapshot::new(&tasks), today);
//! assert_eq!(view.completion_rate, 100);
//! assert_eq!(view.streak, 1);
//! ```
//!
//! Layers:
//! - [`fields`], [`task`]: the record model
//! - [`dates`], [`ordering`]: bucketing and sorting rules
//! - [`snapshot`]: parses each record's dates once and reports unreadable ones
//! - [`heatmap`], [`stats`], [`views`]: pure derivations
//! - [`mutation`]: intents and status/subtask reconciliation
//! - [`db`], [`config`]: the JSON store and layered configuration used by the `pulse` binary

pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod fields;
pub mod heatmap;
pub mod mutation;
pub mod ordering;
pub mod snapshot;
pub mod stats;
pub mod task;
pub mod views;
