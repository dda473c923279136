use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric rank used for priority sorting (higher = more urgent)
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}' (low, medium, high)", other)),
        }
    }
}

/// A single tracked task.
///
/// Field names serialize in camelCase so persisted snapshots and JSON
/// exports stay interchangeable with records written by earlier versions
/// of this app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Free-text label; empty means uncategorized
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Set once at creation, never changes
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    /// Embedded image references, append/remove only
    #[serde(default)]
    pub photos: Vec<String>,
    /// Accumulated minutes; never decreases except via full replacement
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// Overdue: has a due date whose midnight lies strictly before `now`,
    /// and the task is not completed. A task due today counts as overdue
    /// once the day has started.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => !self.completed && due.and_time(NaiveTime::MIN).and_utc() < now,
            None => false,
        }
    }

    /// Whole days past the due date (0 if due today)
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        match self.due_date {
            Some(due) => (now.date_naive() - due).num_days().max(0),
            None => 0,
        }
    }
}

/// Fields for a task about to be created; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: Option<NaiveDate>,
    pub created_by: String,
    pub photos: Vec<String>,
    pub time_spent: u64,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task_due(due: &str, completed: bool) -> Task {
        Task {
            id: "1".into(),
            title: "t".into(),
            description: String::new(),
            completed,
            priority: Priority::Medium,
            category: String::new(),
            due_date: Some(due.parse().unwrap()),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            created_by: "You".into(),
            photos: vec![],
            time_spent: 0,
            tags: vec![],
        }
    }

    #[test]
    fn overdue_when_due_date_in_past() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert!(task_due("2025-06-09", false).is_overdue(now));
    }

    #[test]
    fn due_today_is_overdue_with_zero_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let t = task_due("2025-06-10", false);
        assert!(t.is_overdue(now));
        assert_eq!(t.days_overdue(now), 0);
    }

    #[test]
    fn completed_or_future_is_not_overdue() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert!(!task_due("2025-06-09", true).is_overdue(now));
        assert!(!task_due("2025-06-11", false).is_overdue(now));
    }

    #[test]
    fn no_due_date_is_never_overdue() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let mut t = task_due("2025-06-09", false);
        t.due_date = None;
        assert!(!t.is_overdue(now));
        assert_eq!(t.days_overdue(now), 0);
    }

    #[test]
    fn serde_uses_camel_case_field_names() {
        let t = task_due("2025-06-09", false);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"dueDate\":\"2025-06-09\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"createdBy\""));
        assert!(json.contains("\"timeSpent\":0"));
    }

    #[test]
    fn serde_defaults_on_minimal_record() {
        let t: Task = serde_json::from_str(
            r#"{"id":"42","title":"minimal","createdAt":"2025-06-01T08:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(t.priority, Priority::Medium);
        assert!(!t.completed);
        assert!(t.due_date.is_none());
        assert!(t.tags.is_empty());
        assert_eq!(t.time_spent, 0);
    }
}
