use std::collections::HashSet;

use tracing::{debug, warn};

use crate::io::clock::Clock;
use crate::io::kv::KvStore;
use crate::model::task::{Task, TaskDraft};

/// Storage key for the serialized task list
pub const TASKS_KEY: &str = "todoTasks";

/// Canonical owner of the task list and selection set.
///
/// All mutations go through the store so the persisted snapshot stays
/// consistent: every mutating operation rewrites the full list through the
/// injected key-value port after updating it in memory. Unknown ids are
/// silent no-ops throughout.
pub struct TaskStore {
    tasks: Vec<Task>,
    selected: HashSet<String>,
    /// Pending manual-reorder source; cleared after every drop attempt
    dragged: Option<String>,
    port: Box<dyn KvStore>,
    clock: Box<dyn Clock>,
    last_id: u64,
}

impl TaskStore {
    /// Hydrate a store from the port. A missing snapshot starts empty; a
    /// corrupt one is discarded with a warning rather than crashing.
    pub fn open(port: Box<dyn KvStore>, clock: Box<dyn Clock>) -> Self {
        let tasks = match port.get(TASKS_KEY) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => {
                    debug!(count = tasks.len(), "loaded tasks from storage");
                    tasks
                }
                Err(e) => {
                    warn!(error = %e, "discarding corrupt task snapshot, starting empty");
                    Vec::new()
                }
            },
        };
        TaskStore {
            tasks,
            selected: HashSet::new(),
            dragged: None,
            port,
            clock,
            last_id: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    // -----------------------------------------------------------------------
    // Single-task mutations
    // -----------------------------------------------------------------------

    /// Create a task from a draft, prepending it to the list (newest first).
    /// Returns the assigned id. Title validation happens at the boundary;
    /// the store trusts its caller.
    pub fn add(&mut self, draft: TaskDraft) -> String {
        let now = self.clock.now();
        let id = self.next_id(now.timestamp_millis().max(0) as u64);

        let mut tags = Vec::new();
        for tag in draft.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let task = Task {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            completed: false,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            created_at: now,
            created_by: draft.created_by,
            photos: draft.photos,
            time_spent: draft.time_spent,
            tags,
        };
        debug!(id = %task.id, title = %task.title, "adding task");
        self.tasks.insert(0, task);
        self.persist();
        id
    }

    /// Replace the task with the same id wholesale. The caller carries over
    /// `id` and `created_at` from the original.
    pub fn update(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            debug!(id = %task.id, "updating task");
            *slot = task;
            self.persist();
        }
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        // Prune unconditionally so the selection never dangles
        self.selected.remove(id);
        if self.tasks.len() != before {
            debug!(id, "deleted task");
            self.persist();
        }
    }

    pub fn toggle_completion(&mut self, id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.completed = !task.completed;
            debug!(id, completed = task.completed, "toggled completion");
            self.persist();
        }
    }

    /// Add minutes to a task's accumulated time.
    pub fn update_time(&mut self, id: &str, additional_minutes: u64) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.time_spent += additional_minutes;
            debug!(id, time_spent = task.time_spent, "logged time");
            self.persist();
        }
    }

    // -----------------------------------------------------------------------
    // Selection and bulk operations
    // -----------------------------------------------------------------------

    /// Add or remove an id from the selection set. Idempotent; ids not in
    /// the task list are ignored so the selection never contains dangling
    /// references.
    pub fn select(&mut self, id: &str, selected: bool) {
        if selected {
            if self.tasks.iter().any(|t| t.id == id) {
                self.selected.insert(id.to_string());
            }
        } else {
            self.selected.remove(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Toggle selection of the visible view: if every given id is already
    /// selected, clear the whole selection; otherwise select them all.
    /// Ids not in the task list are ignored as usual.
    pub fn select_all(&mut self, visible_ids: &[String]) {
        let all_selected = visible_ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            self.selected.clear();
        } else {
            for id in visible_ids {
                if self.tasks.iter().any(|t| t.id == *id) {
                    self.selected.insert(id.clone());
                }
            }
        }
    }

    pub fn bulk_delete(&mut self) {
        let selected = std::mem::take(&mut self.selected);
        self.tasks.retain(|t| !selected.contains(&t.id));
        debug!(count = selected.len(), "bulk delete");
        self.persist();
    }

    pub fn bulk_complete(&mut self) {
        self.bulk_set_completed(true);
    }

    pub fn bulk_uncomplete(&mut self) {
        self.bulk_set_completed(false);
    }

    fn bulk_set_completed(&mut self, completed: bool) {
        let selected = std::mem::take(&mut self.selected);
        for task in &mut self.tasks {
            if selected.contains(&task.id) {
                task.completed = completed;
            }
        }
        debug!(count = selected.len(), completed, "bulk completion change");
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Import and reorder
    // -----------------------------------------------------------------------

    /// Append externally supplied tasks verbatim. Imported tasks are trusted
    /// to carry distinct ids.
    pub fn import_tasks(&mut self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "importing tasks");
        self.tasks.extend(tasks);
        self.persist();
    }

    /// Begin a manual reorder.
    pub fn drag_start(&mut self, id: &str) {
        self.dragged = Some(id.to_string());
    }

    /// Complete a pending reorder onto `target_id`. The dragged pointer is
    /// cleared whether or not the drop was valid.
    pub fn drop_on(&mut self, target_id: &str) {
        if let Some(dragged) = self.dragged.take() {
            self.reorder(&dragged, target_id);
        }
    }

    /// Move the dragged task immediately before the target task, preserving
    /// the relative order of everything else. No-op if either id is missing
    /// or both are the same.
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str) {
        if dragged_id == target_id {
            return;
        }
        let Some(from) = self.tasks.iter().position(|t| t.id == dragged_id) else {
            return;
        };
        if !self.tasks.iter().any(|t| t.id == target_id) {
            return;
        }
        let task = self.tasks.remove(from);
        // Target index is recomputed after removal so the dragged task
        // always lands directly before the target
        let to = self
            .tasks
            .iter()
            .position(|t| t.id == target_id)
            .unwrap_or(self.tasks.len());
        self.tasks.insert(to, task);
        debug!(dragged_id, target_id, "reordered tasks");
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Time-based id, bumped past the last issued value and any existing id
    /// so ids stay unique even within one millisecond.
    fn next_id(&mut self, now_millis: u64) -> String {
        let mut candidate = now_millis.max(self.last_id + 1);
        while self.tasks.iter().any(|t| t.id == candidate.to_string()) {
            candidate += 1;
        }
        self.last_id = candidate;
        candidate.to_string()
    }

    /// Best-effort write-through of the full snapshot.
    fn persist(&self) {
        // Vec<Task> serialization cannot fail
        let snapshot = serde_json::to_string(&self.tasks).unwrap_or_else(|_| "[]".to_string());
        if let Err(e) = self.port.set(TASKS_KEY, &snapshot) {
            warn!(error = %e, "failed to persist tasks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::clock::FixedClock;
    use crate::io::kv::MemKvStore;
    use crate::model::task::Priority;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn test_store() -> (TaskStore, MemKvStore) {
        let port = MemKvStore::new();
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
        let store = TaskStore::open(Box::new(port.clone()), Box::new(clock));
        (store, port)
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            created_by: "You".into(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn add_prepends_and_assigns_unique_ids() {
        let (mut store, _) = test_store();
        let a = store.add(draft("first"));
        let b = store.add(draft("second"));
        assert_ne!(a, b);
        // Most recent first
        assert_eq!(store.tasks()[0].title, "second");
        assert_eq!(store.tasks()[1].title, "first");
        assert_eq!(store.tasks()[0].priority, Priority::Medium);
    }

    #[test]
    fn add_dedupes_tags_preserving_order() {
        let (mut store, _) = test_store();
        let mut d = draft("tagged");
        d.tags = vec!["a".into(), "b".into(), "a".into()];
        store.add(d);
        assert_eq!(store.tasks()[0].tags, vec!["a", "b"]);
    }

    #[test]
    fn every_mutation_writes_a_snapshot() {
        let (mut store, port) = test_store();
        let id = store.add(draft("persisted"));
        let raw = port.get(TASKS_KEY).unwrap();
        let saved: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);

        store.toggle_completion(&id);
        let saved: Vec<Task> = serde_json::from_str(&port.get(TASKS_KEY).unwrap()).unwrap();
        assert!(saved[0].completed);
    }

    #[test]
    fn open_hydrates_from_existing_snapshot() {
        let port = MemKvStore::new();
        port.seed(
            TASKS_KEY,
            r#"[{"id":"7","title":"saved","createdAt":"2025-06-01T08:00:00Z"}]"#,
        );
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
        let store = TaskStore::open(Box::new(port), Box::new(clock));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "saved");
    }

    #[test]
    fn open_discards_corrupt_snapshot() {
        let port = MemKvStore::new();
        port.seed(TASKS_KEY, "not json {{{");
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
        let store = TaskStore::open(Box::new(port), Box::new(clock));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn update_replaces_matching_task_only() {
        let (mut store, _) = test_store();
        let id = store.add(draft("before"));
        let mut edited = store.find(&id).unwrap().clone();
        edited.title = "after".into();
        edited.priority = Priority::High;
        store.update(edited);
        assert_eq!(store.tasks()[0].title, "after");

        // Unknown id is a no-op
        let mut ghost = store.tasks()[0].clone();
        ghost.id = "missing".into();
        ghost.title = "ghost".into();
        store.update(ghost);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "after");
    }

    #[test]
    fn update_preserves_created_at_carried_by_caller() {
        let (mut store, _) = test_store();
        let id = store.add(draft("t"));
        let original_created = store.find(&id).unwrap().created_at;
        let mut edited = store.find(&id).unwrap().clone();
        edited.description = "now with details".into();
        store.update(edited);
        assert_eq!(store.find(&id).unwrap().created_at, original_created);
    }

    #[test]
    fn delete_prunes_selection() {
        let (mut store, _) = test_store();
        let id = store.add(draft("doomed"));
        store.select(&id, true);
        assert!(store.selected().contains(&id));

        store.delete(&id);
        assert!(store.tasks().is_empty());
        assert!(store.selected().is_empty());

        // Selecting a deleted id has no effect
        store.select(&id, true);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn toggle_does_not_touch_time_or_tags() {
        let (mut store, _) = test_store();
        let mut d = draft("toggle me");
        d.tags = vec!["keep".into()];
        d.time_spent = 30;
        let id = store.add(d);

        store.toggle_completion(&id);
        let task = store.find(&id).unwrap();
        assert!(task.completed);
        assert_eq!(task.time_spent, 30);
        assert_eq!(task.tags, vec!["keep"]);

        store.toggle_completion(&id);
        assert!(!store.find(&id).unwrap().completed);
    }

    #[test]
    fn update_time_accumulates() {
        let (mut store, _) = test_store();
        let id = store.add(draft("timed"));
        store.update_time(&id, 5);
        store.update_time(&id, 10);
        assert_eq!(store.find(&id).unwrap().time_spent, 15);

        store.update_time("missing", 99);
        assert_eq!(store.find(&id).unwrap().time_spent, 15);
    }

    #[test]
    fn select_is_idempotent() {
        let (mut store, _) = test_store();
        let id = store.add(draft("pick"));
        store.select(&id, true);
        store.select(&id, true);
        assert_eq!(store.selected().len(), 1);
        store.select(&id, false);
        store.select(&id, false);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn select_all_selects_visible_then_toggles_off() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        let visible = vec![a.clone(), b.clone()];

        store.select_all(&visible);
        assert_eq!(store.selected().len(), 2);

        // Every visible id already selected: the same call clears instead
        store.select_all(&visible);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn select_all_with_partial_selection_selects_the_rest() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        store.select(&a, true);

        store.select_all(&[a.clone(), b.clone()]);
        assert_eq!(store.selected().len(), 2);
        assert!(store.selected().contains(&b));

        // Ids not in the task list never enter the selection
        store.clear_selection();
        store.select_all(&[a.clone(), "missing".to_string()]);
        assert_eq!(store.selected().len(), 1);
        assert!(store.selected().contains(&a));
    }

    #[test]
    fn bulk_complete_clears_selection() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        store.select(&a, true);
        store.select(&b, true);

        store.bulk_complete();
        assert!(store.tasks().iter().all(|t| t.completed));
        assert!(store.selected().is_empty());
    }

    #[test]
    fn bulk_uncomplete_and_delete() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        let c = store.add(draft("c"));

        store.select(&a, true);
        store.select(&b, true);
        store.bulk_complete();

        store.select(&a, true);
        store.bulk_uncomplete();
        assert!(!store.find(&a).unwrap().completed);
        assert!(store.find(&b).unwrap().completed);

        store.select(&c, true);
        store.bulk_delete();
        assert!(store.find(&c).is_none());
        assert_eq!(store.tasks().len(), 2);
        assert!(store.selected().is_empty());
    }

    #[test]
    fn import_appends_verbatim() {
        let (mut store, _) = test_store();
        store.add(draft("existing"));
        let imported: Vec<Task> = serde_json::from_str(
            r#"[{"id":"x1","title":"imported","createdAt":"2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        store.import_tasks(imported);
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.tasks()[1].id, "x1");
    }

    #[test]
    fn reorder_places_dragged_before_target() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        let c = store.add(draft("c"));
        // List is newest-first: [c, b, a]
        let order: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![c.as_str(), b.as_str(), a.as_str()]);

        // Drag a (last) onto c (first): a lands immediately before c
        store.reorder(&a, &c);
        let order: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![a.as_str(), c.as_str(), b.as_str()]);

        // Drag a (first) onto b (last): a lands immediately before b,
        // everything else keeps its relative order
        store.reorder(&a, &b);
        let order: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec![c.as_str(), a.as_str(), b.as_str()]);
    }

    #[test]
    fn reorder_same_or_missing_ids_is_noop() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        let b = store.add(draft("b"));
        let before: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();

        store.reorder(&a, &a);
        store.reorder("missing", &b);
        store.reorder(&a, "missing");
        let after: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn drop_clears_dragged_pointer_unconditionally() {
        let (mut store, _) = test_store();
        let a = store.add(draft("a"));
        store.drag_start(&a);
        assert_eq!(store.dragged(), Some(a.as_str()));

        // Invalid drop target: still cleared
        store.drop_on("missing");
        assert!(store.dragged().is_none());

        let b = store.add(draft("b"));
        store.drag_start(&a);
        store.drop_on(&b);
        assert!(store.dragged().is_none());
        assert_eq!(store.tasks()[0].id, a);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let (mut store, _) = test_store();
        // FixedClock returns the same instant for every add
        let ids: Vec<String> = (0..5).map(|_| store.add(draft("burst"))).collect();
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
