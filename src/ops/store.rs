use std::collections::HashSet;

use tracing::{debug, warn};

use crate::io::storage::{StorageError, TaskStorage};
use crate::model::task::{self, parse_timestamp};
use crate::model::{Task, TaskDocument, TaskSummary};
use crate::ops::sort;

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task text is empty")]
    EmptyText,
    #[error("task not found: {0}")]
    NotFound(u64),
    #[error("no task ids left")]
    IdsExhausted,
}

/// Owner of the task collection.
///
/// Every mutation is written through to `storage` before it returns. A
/// failed write is logged and otherwise ignored: the in-memory collection
/// stays authoritative and the next mutation writes the whole document again.
pub struct TaskStore<S> {
    storage: S,
    /// Insertion order; use [`TaskStore::list_sorted`] for display order
    tasks: Vec<Task>,
    next_task_id: u64,
}

impl<S: TaskStorage> TaskStore<S> {
    /// An empty store. Nothing is read until [`TaskStore::load`].
    pub fn new(storage: S) -> Self {
        TaskStore {
            storage,
            tasks: Vec::new(),
            next_task_id: 1,
        }
    }

    /// Prepare the storage location and load whatever is saved there.
    pub fn open(storage: S) -> Self {
        if let Err(e) = storage.ensure_location() {
            warn!("{}", e);
        }
        let mut store = TaskStore::new(storage);
        store.load();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn next_task_id(&self) -> u64 {
        self.next_task_id
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary::from_tasks(&self.tasks)
    }

    /// All tasks in menu order, recomputed on every call.
    pub fn list_sorted(&self) -> Vec<&Task> {
        sort::sorted(&self.tasks)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a task with the trimmed `text`. Whitespace-only text is rejected
    /// without touching the collection or the file.
    pub fn add_task(&mut self, text: &str) -> Result<Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        // counter stays above every issued id; u64::MAX is never issued
        let next = self
            .next_task_id
            .checked_add(1)
            .ok_or(TaskError::IdsExhausted)?;
        let task = Task::new(self.next_task_id, text.to_string());
        self.next_task_id = next;
        self.tasks.push(task.clone());
        debug!(id = task.id, "added task");
        self.persist();
        Ok(task)
    }

    /// Flip the completed flag. Returns the updated task.
    pub fn toggle_task(&mut self, id: u64) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.completed = !task.completed;
        let task = task.clone();
        debug!(id, completed = task.completed, "toggled task");
        self.persist();
        Ok(task)
    }

    /// Remove a task. Returns the removed task.
    pub fn delete_task(&mut self, id: u64) -> Result<Task, TaskError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        let task = self.tasks.remove(idx);
        debug!(id, "deleted task");
        self.persist();
        Ok(task)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Replace the collection with the saved document.
    ///
    /// A missing document gives an empty list. An unreadable one is logged
    /// and also gives an empty list. Tasks saved without `completed` or
    /// `createdAt` are filled in (not completed, created now).
    pub fn load(&mut self) {
        match self.storage.read() {
            Ok(Some(doc)) => self.apply_document(doc),
            Ok(None) => self.reset(),
            Err(e) => {
                warn!("{}; starting with an empty task list", e);
                self.reset();
            }
        }
    }

    /// Write the current collection, stamped with the current time.
    pub fn save(&self) -> Result<(), StorageError> {
        let doc = TaskDocument::snapshot(&self.tasks, self.next_task_id, task::now());
        self.storage.write(&doc)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("{}; changes are kept in memory only", e);
        }
    }

    fn reset(&mut self) {
        self.tasks.clear();
        self.next_task_id = 1;
    }

    fn apply_document(&mut self, doc: TaskDocument) {
        let loaded_at = task::now();
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(doc.tasks.len());

        for stored in doc.tasks {
            if stored.id == 0 || stored.id == u64::MAX {
                warn!(id = stored.id, "dropping task with out-of-range id");
                continue;
            }
            if !seen.insert(stored.id) {
                warn!(id = stored.id, "dropping task with duplicate id");
                continue;
            }
            let created_at = match stored.created_at.as_deref() {
                Some(s) => parse_timestamp(s).unwrap_or_else(|| {
                    warn!(id = stored.id, "unreadable createdAt {:?}, using load time", s);
                    loaded_at
                }),
                None => loaded_at,
            };
            tasks.push(Task {
                id: stored.id,
                text: stored.text,
                completed: stored.completed.unwrap_or(false),
                created_at,
            });
        }

        // The counter must stay ahead of every id on file.
        let floor = tasks.iter().map(|t| t.id.saturating_add(1)).max().unwrap_or(1);
        self.next_task_id = doc.next_task_id.unwrap_or(1).max(floor);
        self.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::{JsonFileStorage, MemoryStorage};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sorted_ids<S: TaskStorage>(store: &TaskStore<S>) -> Vec<u64> {
        store.list_sorted().iter().map(|t| t.id).collect()
    }

    #[test]
    fn add_first_task() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        let task = store.add_task("Buy milk").unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(store.next_task_id(), 2);
        assert_eq!(sorted_ids(&store), vec![1]);
        assert_eq!(storage.write_count(), 1);
    }

    #[test]
    fn add_trims_text() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let task = store.add_task("  call mom \n").unwrap();
        assert_eq!(task.text, "call mom");
    }

    #[test]
    fn empty_text_is_rejected_without_write() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        assert_eq!(store.add_task(""), Err(TaskError::EmptyText));
        assert_eq!(store.add_task("   "), Err(TaskError::EmptyText));
        assert_eq!(store.add_task("\t\n"), Err(TaskError::EmptyText));
        assert!(store.is_empty());
        assert_eq!(store.next_task_id(), 1);
        assert_eq!(storage.write_count(), 0);
        assert!(storage.content().is_none());
    }

    #[test]
    fn newer_tasks_sort_first() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();
        let sorted: Vec<&str> = store.list_sorted().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(sorted, vec!["B", "A"]);
    }

    #[test]
    fn toggling_moves_completed_tasks_last() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();
        store.add_task("C").unwrap();

        let toggled = store.toggle_task(3).unwrap();
        assert!(toggled.completed);
        assert_eq!(sorted_ids(&store), vec![2, 1, 3]);

        store.toggle_task(3).unwrap();
        assert_eq!(sorted_ids(&store), vec![3, 2, 1]);
    }

    #[test]
    fn toggle_both_then_descending_ids() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();

        store.toggle_task(1).unwrap();
        assert_eq!(sorted_ids(&store), vec![2, 1]);
        assert!(store.get(1).unwrap().completed);

        store.toggle_task(2).unwrap();
        assert_eq!(sorted_ids(&store), vec![2, 1]);
        assert!(store.tasks().iter().all(|t| t.completed));
    }

    #[test]
    fn delete_leaves_other_task_untouched() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();
        let before = store.get(1).unwrap().clone();

        let removed = store.delete_task(2).unwrap();
        assert_eq!(removed.text, "B");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1), Some(&before));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        store.add_task("A").unwrap();
        store.toggle_task(1).unwrap();
        let before = store.tasks().to_vec();
        let writes = storage.write_count();

        assert_eq!(store.toggle_task(42), Err(TaskError::NotFound(42)));
        assert_eq!(store.delete_task(42), Err(TaskError::NotFound(42)));
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.next_task_id(), 2);
        assert_eq!(storage.write_count(), writes);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let mut issued = Vec::new();
        for round in 0..5 {
            let a = store.add_task(&format!("a{}", round)).unwrap();
            let b = store.add_task(&format!("b{}", round)).unwrap();
            for id in [a.id, b.id] {
                assert!(issued.iter().all(|&prev| id > prev));
                issued.push(id);
            }
            store.delete_task(b.id).unwrap();
            if round % 2 == 0 {
                store.delete_task(a.id).unwrap();
            }
        }
        assert_eq!(store.next_task_id(), 11);
    }

    #[test]
    fn deleting_newest_does_not_rewind_counter() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();
        store.delete_task(2).unwrap();

        let mut reopened = TaskStore::new(&storage);
        reopened.load();
        assert_eq!(reopened.next_task_id(), 3);
        assert_eq!(reopened.add_task("C").unwrap().id, 3);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");

        let mut store = TaskStore::open(JsonFileStorage::new(&path));
        store.add_task("Buy milk").unwrap();
        store.add_task("Walk dog").unwrap();
        store.add_task("Taxes").unwrap();
        store.toggle_task(2).unwrap();
        store.delete_task(3).unwrap();

        let reopened = TaskStore::open(JsonFileStorage::new(&path));
        assert_eq!(reopened.tasks(), store.tasks());
        assert_eq!(reopened.next_task_id(), 4);
    }

    #[test]
    fn missing_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let store = TaskStore::open(JsonFileStorage::new(tmp.path().join("data/tasks.json")));
        assert!(store.is_empty());
        assert_eq!(store.next_task_id(), 1);
        // directory prepared for the first save
        assert!(tmp.path().join("data").is_dir());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let storage = MemoryStorage::with_content("{ this is not json");
        let mut store = TaskStore::new(&storage);
        store.load();
        assert!(store.is_empty());
        assert_eq!(store.next_task_id(), 1);
    }

    #[test]
    fn corrupt_file_on_disk_is_backed_up_before_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        std::fs::write(&path, "{\"tasks\": [1, 2, 3]}").unwrap();

        let mut store = TaskStore::open(JsonFileStorage::new(&path));
        assert!(store.is_empty());
        store.add_task("fresh start").unwrap();

        assert_eq!(
            std::fs::read_to_string(tmp.path().join("tasks.json.bak")).unwrap(),
            "{\"tasks\": [1, 2, 3]}"
        );
        let reopened = TaskStore::open(JsonFileStorage::new(&path));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn load_repairs_missing_fields() {
        let storage = MemoryStorage::with_content(
            r#"{"tasks":[{"id":4,"text":"old"},{"id":5,"text":"done","completed":true,"createdAt":"2024-01-01T00:00:00.000Z"}]}"#,
        );
        let before = task::now();
        let mut store = TaskStore::new(&storage);
        store.load();

        let old = store.get(4).unwrap();
        assert!(!old.completed);
        assert!(old.created_at >= before);

        let done = store.get(5).unwrap();
        assert!(done.completed);
        assert_eq!(task::format_timestamp(&done.created_at), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn load_raises_stale_counter() {
        let storage =
            MemoryStorage::with_content(r#"{"tasks":[{"id":7,"text":"x"}],"nextTaskId":2}"#);
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.next_task_id(), 8);

        let storage = MemoryStorage::with_content(r#"{"tasks":[],"nextTaskId":0}"#);
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.next_task_id(), 1);
    }

    #[test]
    fn load_drops_out_of_range_ids() {
        let storage = MemoryStorage::with_content(
            r#"{"tasks":[{"id":18446744073709551615,"text":"max"},{"id":0,"text":"zero"},{"id":4,"text":"ok"}],"nextTaskId":2}"#,
        );
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.len(), 1);
        assert!(store.get(4).is_some());
        assert_eq!(store.next_task_id(), 5);
    }

    #[test]
    fn add_refuses_when_ids_run_out() {
        let storage = MemoryStorage::with_content(
            r#"{"tasks":[{"id":18446744073709551614,"text":"last"}],"nextTaskId":2}"#,
        );
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.next_task_id(), u64::MAX);

        assert_eq!(store.add_task("y"), Err(TaskError::IdsExhausted));
        assert_eq!(store.len(), 1);
        assert_eq!(store.next_task_id(), u64::MAX);
        assert_eq!(storage.write_count(), 0);

        let storage = MemoryStorage::with_content(r#"{"tasks":[],"nextTaskId":18446744073709551615}"#);
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.add_task("y"), Err(TaskError::IdsExhausted));
        assert!(store.is_empty());
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let storage = MemoryStorage::with_content(
            r#"{"tasks":[{"id":1,"text":"first"},{"id":1,"text":"second"}],"nextTaskId":2}"#,
        );
        let mut store = TaskStore::new(&storage);
        store.load();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().text, "first");
    }

    #[test]
    fn failed_save_keeps_memory_state() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut store = TaskStore::new(&storage);

        let task = store.add_task("survives").unwrap();
        assert_eq!(store.get(task.id), Some(&task));
        assert!(store.save().is_err());
        assert!(storage.content().is_none());

        // next mutation retries the full write
        storage.set_fail_writes(false);
        store.toggle_task(task.id).unwrap();
        let mut reopened = TaskStore::new(&storage);
        reopened.load();
        assert_eq!(reopened.tasks(), store.tasks());
    }

    #[test]
    fn saved_document_carries_counter_and_timestamp() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::new(&storage);
        store.add_task("A").unwrap();
        store.delete_task(1).unwrap();

        let doc: TaskDocument = serde_json::from_str(&storage.content().unwrap()).unwrap();
        assert!(doc.tasks.is_empty());
        assert_eq!(doc.next_task_id, Some(2));
        assert!(doc.last_saved.as_deref().and_then(parse_timestamp).is_some());
    }

    #[test]
    fn summary_tracks_pending() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add_task("A").unwrap();
        store.add_task("B").unwrap();
        store.toggle_task(1).unwrap();
        assert_eq!(store.summary(), TaskSummary { pending: 1, total: 2 });
    }
}
