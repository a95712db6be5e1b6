//! Enumerations used to classify tasks.
//!
//! Every enum carries an `Unknown` variant. Records coming from the store may hold
//! values outside the known set; those are kept and bucketed as `Unknown` rather than
//! rejected, so one odd record never prevents a view from being computed.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, Default, Serialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Learning,
    Fitness,
    Work,
    Personal,
    #[default]
    #[value(skip)]
    Unknown,
}

impl Category {
    /// Case-insensitive parse. Unrecognised input maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match normalise(raw).as_str() {
            "learning" => Category::Learning,
            "fitness" => Category::Fitness,
            "work" => Category::Work,
            "personal" => Category::Personal,
            _ => Category::Unknown,
        }
    }

    /// Display name, as written to the store.
    pub fn label(self) -> &'static str {
        match self {
            Category::Learning => "Learning",
            Category::Fitness => "Fitness",
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Unknown => "Unknown",
        }
    }
}

/// Task importance. Declaration order is display order: High first.
#[derive(Debug, Clone, Copy, Default, Serialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    #[value(skip)]
    Unknown,
}

impl Priority {
    pub const KNOWN: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Case-insensitive parse. Unrecognised input maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match normalise(raw).as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown => "Unknown",
        }
    }
}

/// Completion state. Only `Completed` counts as done; everything else is pending work.
#[derive(Debug, Clone, Copy, Default, Serialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    #[value(name = "in-progress")]
    InProgress,
    Completed,
    #[default]
    #[value(skip)]
    Unknown,
}

impl Status {
    /// Case-insensitive parse; accepts "In Progress", "in-progress" and "in_progress".
    pub fn parse(raw: &str) -> Self {
        match normalise(raw).as_str() {
            "pending" => Status::Pending,
            "inprogress" => Status::InProgress,
            "completed" => Status::Completed,
            _ => Status::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
            Status::Unknown => "Unknown",
        }
    }

    /// Only `Completed` counts as done.
    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }
}

fn normalise(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Category::parse(&String::deserialize(deserializer)?))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Priority::parse(&String::deserialize(deserializer)?))
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Status::parse(&String::deserialize(deserializer)?))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("High", Priority::High)]
    #[case("high", Priority::High)]
    #[case(" MEDIUM ", Priority::Medium)]
    #[case("low", Priority::Low)]
    #[case("urgent", Priority::Unknown)]
    #[case("", Priority::Unknown)]
    fn parses_priority_fail_soft(#[case] raw: &str, #[case] expected: Priority) {
        assert_eq!(Priority::parse(raw), expected);
    }

    #[rstest]
    #[case("In Progress", Status::InProgress)]
    #[case("in-progress", Status::InProgress)]
    #[case("COMPLETED", Status::Completed)]
    #[case("done", Status::Unknown)]
    fn parses_status_variants(#[case] raw: &str, #[case] expected: Status) {
        assert_eq!(Status::parse(raw), expected);
    }

    #[test]
    fn serialises_with_display_labels() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"In Progress\"");
        assert_eq!(serde_json::to_string(&Category::Fitness).unwrap(), "\"Fitness\"");
        let parsed: Category = serde_json::from_str("\"Hobbies\"").unwrap();
        assert_eq!(parsed, Category::Unknown);
    }

    #[test]
    fn priority_order_puts_high_first_and_unknown_last() {
        let mut levels = vec![Priority::Unknown, Priority::Low, Priority::High, Priority::Medium];
        levels.sort();
        assert_eq!(levels, vec![Priority::High, Priority::Medium, Priority::Low, Priority::Unknown]);
    }
}
