use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::task::Task;

/// A notification event: title, body, dedup tag, and whether the
/// presentation layer should keep it on screen until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub require_interaction: bool,
}

/// Emission boundary. Denied or unsupported notification capability is not
/// an error; the sink simply swallows the event.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Prints notifications to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        eprintln!("[!] {}: {}", notification.title, notification.body);
    }
}

/// Swallows everything (the permission-denied path).
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: &Notification) {}
}

/// Tracks which overdue tasks have already been announced.
///
/// Per task id: not-notified → notified when the task becomes overdue, back
/// to not-notified when it stops being overdue (completed, due date moved,
/// or deleted), which re-arms it for a later overdue transition.
#[derive(Debug, Default)]
pub struct OverdueWatcher {
    notified: HashSet<String>,
}

impl OverdueWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one periodic check: returns one notification per newly-overdue
    /// task and prunes the notified set down to the currently-overdue ids.
    pub fn check(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Vec<Notification> {
        let overdue: Vec<&Task> = tasks.iter().filter(|t| t.is_overdue(now)).collect();

        let mut fresh = Vec::new();
        for task in &overdue {
            if !self.notified.contains(&task.id) {
                fresh.push(overdue_notification(task, now));
            }
        }

        // Tasks no longer overdue lose their mark so they can re-notify
        self.notified = overdue.iter().map(|t| t.id.clone()).collect();
        debug!(
            overdue = overdue.len(),
            newly = fresh.len(),
            "overdue check"
        );
        fresh
    }
}

fn overdue_notification(task: &Task, now: DateTime<Utc>) -> Notification {
    let days = task.days_overdue(now);
    let body = if days == 0 {
        format!("\"{}\" is due today", task.title)
    } else if days == 1 {
        format!("\"{}\" is 1 day overdue", task.title)
    } else {
        format!("\"{}\" is {} days overdue", task.title, days)
    };
    Notification {
        title: "Task Overdue!".into(),
        body,
        tag: format!("overdue-{}", task.id),
        require_interaction: true,
    }
}

// ---------------------------------------------------------------------------
// One-shot event notifications (fired once per triggering user action)
// ---------------------------------------------------------------------------

pub fn task_added(title: &str) -> Notification {
    event("Task Added", format!("\"{}\" was added to your list", title))
}

pub fn task_updated(title: &str) -> Notification {
    event("Task Updated", format!("\"{}\" was updated", title))
}

/// Only fired on the false→true completion transition.
pub fn task_completed(title: &str) -> Notification {
    event("Task Completed", format!("Nice work! \"{}\" is done", title))
}

pub fn task_deleted(title: &str) -> Notification {
    event("Task Deleted", format!("\"{}\" was removed", title))
}

pub fn template_used(name: &str) -> Notification {
    event(
        "Task Created",
        format!("Created a task from the \"{}\" template", name),
    )
}

fn event(title: &str, body: String) -> Notification {
    Notification {
        title: title.into(),
        body,
        tag: title.to_ascii_lowercase().replace(' ', "-"),
        require_interaction: false,
    }
}
