use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::Task;
use crate::model::template::TaskTemplate;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a> {
    pub total: usize,
    pub shown: usize,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct TemplatesJson<'a> {
    pub templates: &'a [TaskTemplate],
}

#[derive(Serialize)]
pub struct CategoriesJson {
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub mode: &'static str,
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// One-line task summary: `[x] 1717... Buy milk  !high @Personal due:2025-06-12 #shopping (5m)`
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{}] {}  {}", check, task.id, task.title);
    line.push_str(&format!("  !{}", task.priority));
    if !task.category.is_empty() {
        line.push_str(&format!(" @{}", task.category));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due:{}", due));
        if task.is_overdue(now) {
            line.push_str(" OVERDUE");
        }
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    if task.time_spent > 0 {
        line.push_str(&format!(" ({}m)", task.time_spent));
    }
    line
}

/// Multi-line detail view for `show`.
pub fn task_detail(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  [{}]\n", task.title, task.id));
    out.push_str(&format!(
        "  status:    {}\n",
        if task.completed { "completed" } else { "pending" }
    ));
    out.push_str(&format!("  priority:  {}\n", task.priority));
    if !task.category.is_empty() {
        out.push_str(&format!("  category:  {}\n", task.category));
    }
    match task.due_date {
        Some(due) if task.is_overdue(now) => {
            out.push_str(&format!(
                "  due:       {} ({} days overdue)\n",
                due,
                task.days_overdue(now)
            ));
        }
        Some(due) => out.push_str(&format!("  due:       {}\n", due)),
        None => {}
    }
    if !task.description.is_empty() {
        out.push_str(&format!("  notes:     {}\n", task.description));
    }
    if !task.tags.is_empty() {
        out.push_str(&format!("  tags:      {}\n", task.tags.join(", ")));
    }
    if task.time_spent > 0 {
        out.push_str(&format!("  time:      {}m\n", task.time_spent));
    }
    if !task.photos.is_empty() {
        out.push_str(&format!("  photos:    {}\n", task.photos.len()));
    }
    out.push_str(&format!("  created:   {} by {}\n", task.created_at, task.created_by));
    out
}

/// One-line template summary.
pub fn template_line(template: &TaskTemplate) -> String {
    format!(
        "{}  !{} @{} ~{}m - {}",
        template.name,
        template.priority,
        template.category,
        template.estimated_time,
        template.description
    )
}
