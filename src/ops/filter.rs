use std::cmp::Ordering;
use std::str::FromStr;

use indexmap::IndexSet;

use crate::model::task::{Priority, Task};

/// Completion-status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "pending" => Ok(StatusFilter::Pending),
            other => Err(format!(
                "unknown status '{}' (all, completed, pending)",
                other
            )),
        }
    }
}

/// Sort key for the view list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first (default display convention)
    #[default]
    CreatedAt,
    /// Tasks without a due date sort last; the rest ascending
    DueDate,
    /// High to low
    Priority,
    /// Most minutes first
    TimeSpent,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "created" | "createdat" => Ok(SortKey::CreatedAt),
            "due" | "duedate" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "time" | "timespent" => Ok(SortKey::TimeSpent),
            other => Err(format!(
                "unknown sort key '{}' (created, due, priority, time)",
                other
            )),
        }
    }
}

/// Active filter/sort configuration. `apply` derives the view list without
/// mutating the task list.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive containment over title, description, and tags;
    /// empty matches everything
    pub search: String,
    pub status: StatusFilter,
    /// `None` means all priorities
    pub priority: Option<Priority>,
    /// `None` means all categories; otherwise an exact match
    pub category: Option<String>,
    pub sort: SortKey,
}

impl TaskFilter {
    /// A task passes iff every active clause holds.
    pub fn matches(&self, task: &Task) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || task.title.to_lowercase().contains(&search)
            || task.description.to_lowercase().contains(&search)
            || task.tags.iter().any(|t| t.to_lowercase().contains(&search));

        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        };

        let matches_priority = self.priority.is_none_or(|p| task.priority == p);
        let matches_category = self
            .category
            .as_ref()
            .is_none_or(|c| task.category == *c);

        matches_search && matches_status && matches_priority && matches_category
    }

    /// Filter then stable-sort into the ordered view list.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let mut view: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();
        view.sort_by(|a, b| compare(self.sort, a, b));
        view
    }
}

fn compare(sort: SortKey, a: &Task, b: &Task) -> Ordering {
    match sort {
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(da), Some(db)) => da.cmp(&db),
        },
        SortKey::Priority => b.priority.rank().cmp(&a.priority.rank()),
        SortKey::TimeSpent => b.time_spent.cmp(&a.time_spent),
        SortKey::CreatedAt => b.created_at.cmp(&a.created_at),
    }
}

/// Distinct non-empty categories across the full (unfiltered) list, in
/// first-appearance order. Drives the category-filter options.
pub fn categories(tasks: &[Task]) -> Vec<String> {
    let mut set: IndexSet<&str> = IndexSet::new();
    for task in tasks {
        if !task.category.is_empty() {
            set.insert(task.category.as_str());
        }
    }
    set.into_iter().map(str::to_string).collect()
}
