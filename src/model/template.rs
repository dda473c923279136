use serde::{Deserialize, Serialize};

use crate::model::task::{Priority, TaskDraft};

/// A reusable task blueprint.
///
/// Templates carry exactly the fields the add-from-template operation
/// consumes; `estimated_time` is informational and does not pre-fill
/// `time_spent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub tags: Vec<String>,
    /// Estimated minutes to complete
    pub estimated_time: u64,
}

impl TaskTemplate {
    /// Build a draft from this template. The template name becomes the
    /// task title; time spent always starts at zero.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.name.clone(),
            description: self.description.clone(),
            priority: self.priority,
            category: self.category.clone(),
            due_date: None,
            created_by: "You".to_string(),
            photos: Vec::new(),
            time_spent: 0,
            tags: self.tags.clone(),
        }
    }
}

/// The templates that ship with the binary.
pub fn builtin_templates() -> Vec<TaskTemplate> {
    vec![
        TaskTemplate {
            name: "Daily Standup".into(),
            description: "Prepare for daily team standup meeting".into(),
            priority: Priority::Medium,
            category: "Work".into(),
            tags: vec!["meeting".into(), "daily".into()],
            estimated_time: 15,
        },
        TaskTemplate {
            name: "Code Review".into(),
            description: "Review pull requests and provide feedback".into(),
            priority: Priority::High,
            category: "Work".into(),
            tags: vec!["development".into(), "review".into()],
            estimated_time: 30,
        },
        TaskTemplate {
            name: "Grocery Shopping".into(),
            description: "Buy weekly groceries".into(),
            priority: Priority::Low,
            category: "Personal".into(),
            tags: vec!["shopping".into(), "weekly".into()],
            estimated_time: 60,
        },
        TaskTemplate {
            name: "Exercise Session".into(),
            description: "Complete workout routine".into(),
            priority: Priority::Medium,
            category: "Health".into(),
            tags: vec!["fitness".into(), "routine".into()],
            estimated_time: 45,
        },
    ]
}

/// Case-insensitive lookup by template name.
pub fn find_template<'a>(templates: &'a [TaskTemplate], name: &str) -> Option<&'a TaskTemplate> {
    templates
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}
