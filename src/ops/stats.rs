use indexmap::IndexMap;
use serde::Serialize;

use crate::model::task::Task;

/// Headline counters shown above the task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Sum of minutes across all tasks
    pub total_time_spent: u64,
}

impl TaskStats {
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        TaskStats {
            total,
            completed,
            pending: total - completed,
            total_time_spent: tasks.iter().map(|t| t.time_spent).sum(),
        }
    }
}

/// Derived analytics for the reporting view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAnalytics {
    /// Percentage of tasks completed, 0 when the list is empty
    pub completion_rate: f64,
    pub total_time_spent: u64,
    /// Mean minutes per task, 0 when the list is empty
    pub avg_time_per_task: f64,
    /// Task counts per category, first-appearance order; empty categories
    /// group under "Uncategorized"
    pub by_category: IndexMap<String, usize>,
    /// Task counts per priority label, first-appearance order
    pub by_priority: IndexMap<String, usize>,
}

impl TaskAnalytics {
    pub fn of(tasks: &[Task]) -> Self {
        let stats = TaskStats::of(tasks);

        let mut by_category: IndexMap<String, usize> = IndexMap::new();
        let mut by_priority: IndexMap<String, usize> = IndexMap::new();
        for task in tasks {
            let category = if task.category.is_empty() {
                "Uncategorized"
            } else {
                task.category.as_str()
            };
            *by_category.entry(category.to_string()).or_default() += 1;
            *by_priority
                .entry(task.priority.label().to_string())
                .or_default() += 1;
        }

        let completion_rate = if stats.total > 0 {
            stats.completed as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };
        let avg_time_per_task = if stats.total > 0 {
            stats.total_time_spent as f64 / stats.total as f64
        } else {
            0.0
        };

        TaskAnalytics {
            completion_rate,
            total_time_spent: stats.total_time_spent,
            avg_time_per_task,
            by_category,
            by_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::clock::FixedClock;
    use crate::io::kv::MemKvStore;
    use crate::model::task::{Priority, TaskDraft};
    use crate::ops::store::TaskStore;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn store() -> TaskStore {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
        TaskStore::open(Box::new(MemKvStore::new()), Box::new(clock))
    }

    #[test]
    fn empty_list_yields_zeroes() {
        let stats = TaskStats::of(&[]);
        assert_eq!(
            stats,
            TaskStats {
                total: 0,
                completed: 0,
                pending: 0,
                total_time_spent: 0
            }
        );
        let analytics = TaskAnalytics::of(&[]);
        assert_eq!(analytics.completion_rate, 0.0);
        assert_eq!(analytics.avg_time_per_task, 0.0);
        assert!(analytics.by_category.is_empty());
    }

    #[test]
    fn add_toggle_delete_scenario() {
        let mut store = store();
        let id = store.add(TaskDraft {
            title: "Buy milk".into(),
            priority: Priority::Low,
            ..TaskDraft::default()
        });

        let analytics = TaskAnalytics::of(store.tasks());
        assert_eq!(analytics.completion_rate, 0.0);
        assert_eq!(TaskStats::of(store.tasks()).pending, 1);

        store.toggle_completion(&id);
        assert_eq!(TaskAnalytics::of(store.tasks()).completion_rate, 100.0);

        store.delete(&id);
        assert_eq!(TaskStats::of(store.tasks()).total, 0);
    }

    #[test]
    fn time_totals_and_average() {
        let mut store = store();
        let a = store.add(TaskDraft {
            title: "a".into(),
            ..TaskDraft::default()
        });
        let b = store.add(TaskDraft {
            title: "b".into(),
            ..TaskDraft::default()
        });
        store.update_time(&a, 30);
        store.update_time(&b, 90);

        let analytics = TaskAnalytics::of(store.tasks());
        assert_eq!(analytics.total_time_spent, 120);
        assert_eq!(analytics.avg_time_per_task, 60.0);
    }

    #[test]
    fn breakdowns_group_and_count() {
        let mut store = store();
        store.add(TaskDraft {
            title: "w1".into(),
            category: "Work".into(),
            priority: Priority::High,
            ..TaskDraft::default()
        });
        store.add(TaskDraft {
            title: "w2".into(),
            category: "Work".into(),
            ..TaskDraft::default()
        });
        store.add(TaskDraft {
            title: "loose".into(),
            ..TaskDraft::default()
        });

        let analytics = TaskAnalytics::of(store.tasks());
        assert_eq!(analytics.by_category.get("Work"), Some(&2));
        assert_eq!(analytics.by_category.get("Uncategorized"), Some(&1));
        assert_eq!(analytics.by_priority.get("high"), Some(&1));
        assert_eq!(analytics.by_priority.get("medium"), Some(&2));
    }
}
