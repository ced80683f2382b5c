use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use super::lifecycle;
use super::slot::{MemorySlot, StorageSlot};
use super::types::{NewTask, Task};

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Owns the ordered task list and mirrors every commit to its slot.
///
/// Commits are serialized by one lock: a transform sees the latest committed
/// list, and the slot is written before the lock is released. Commits block on
/// that write, so async callers run them on the blocking pool.
pub struct TaskStore {
    slot: Arc<dyn StorageSlot>,
    tasks: Mutex<Vec<Task>>,
}

impl TaskStore {
    /// Reads the prior snapshot from `slot`. A missing, unreadable or corrupt
    /// snapshot yields an empty store.
    pub fn load(slot: Arc<dyn StorageSlot>) -> Self {
        let tasks = match slot.read() {
            Ok(Some(raw)) => Self::decode(&raw).unwrap_or_else(|| {
                warn!("persisted task snapshot is not valid, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read task snapshot, starting empty");
                Vec::new()
            }
        };
        debug!(count = tasks.len(), "task store loaded");
        Self {
            slot,
            tasks: Mutex::new(tasks),
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Arc::new(MemorySlot::new()))
    }

    pub fn decode(raw: &str) -> Option<Vec<Task>> {
        serde_json::from_str::<Vec<Task>>(raw).ok()
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().iter().find(|t| t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Applies `transform` to the whole list and commits the result.
    pub fn replace<F>(&self, transform: F) -> Vec<Task>
    where
        F: FnOnce(&[Task]) -> Vec<Task>,
    {
        let mut tasks = self.lock();
        let next = transform(&tasks);
        self.persist(&next);
        *tasks = next;
        tasks.clone()
    }

    /// Like [`TaskStore::replace`], but a transform returning `None` leaves the
    /// store untouched and skips the slot write. Returns whether it committed.
    pub fn replace_if<F>(&self, transform: F) -> bool
    where
        F: FnOnce(&[Task]) -> Option<Vec<Task>>,
    {
        let mut tasks = self.lock();
        match transform(&tasks) {
            Some(next) => {
                self.persist(&next);
                *tasks = next;
                true
            }
            None => false,
        }
    }

    /// Builds a task from `new_task` with a fresh id and prepends it.
    pub fn create(&self, new_task: NewTask) -> Task {
        let mut tasks = self.lock();
        let task = new_task.into_task(unique_id(&tasks));
        let next = lifecycle::create(&tasks, task.clone());
        self.persist(&next);
        *tasks = next;
        task
    }

    fn persist(&self, tasks: &[Task]) {
        let serialized = match serde_json::to_string_pretty(tasks) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "could not serialize tasks");
                return;
            }
        };
        if let Err(err) = self.slot.write(&serialized) {
            warn!(error = %err, "could not persist tasks");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn unique_id(tasks: &[Task]) -> String {
    let taken: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut id = next_id();
    while taken.contains(id.as_str()) {
        id = next_id();
    }
    id
}

fn next_id() -> String {
    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("task_{}_{}", Utc::now().timestamp_millis(), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::slot::FileSlot;
    use crate::task::types::{Priority, TaskStatus};

    fn store_with_slot() -> (TaskStore, Arc<MemorySlot>) {
        let slot = Arc::new(MemorySlot::new());
        (TaskStore::load(slot.clone()), slot)
    }

    #[test]
    fn empty_slot_loads_empty_store() {
        let (store, slot) = store_with_slot();
        assert!(store.is_empty());
        assert_eq!(slot.writes(), 0);
    }

    #[test]
    fn corrupt_snapshot_fails_open_to_empty() {
        let slot = Arc::new(MemorySlot::with_contents("{not json"));
        let store = TaskStore::load(slot);
        assert!(store.is_empty());
    }

    #[test]
    fn create_assigns_unique_ids_and_persists() {
        let (store, slot) = store_with_slot();
        let a = store.create(NewTask::titled("a", Priority::Low));
        let b = store.create(NewTask::titled("b", Priority::High));
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot()[0].id, b.id);
        assert_eq!(slot.writes(), 2);
        assert_eq!(a.status, TaskStatus::Todo);
    }

    #[test]
    fn every_replace_writes_the_full_list() {
        let (store, slot) = store_with_slot();
        let task = store.create(NewTask::titled("essay", Priority::Medium));
        store.replace(|tasks| lifecycle::toggle_timer(tasks, &task.id));

        let persisted = TaskStore::decode(&slot.contents().unwrap()).unwrap();
        assert_eq!(persisted, store.snapshot());
        assert!(persisted[0].is_timer_running);
    }

    #[test]
    fn declined_transform_skips_commit() {
        let (store, slot) = store_with_slot();
        store.create(NewTask::titled("essay", Priority::Medium));
        let before = slot.writes();
        assert!(!store.replace_if(|_| None));
        assert_eq!(slot.writes(), before);
    }

    #[test]
    fn snapshot_survives_reload_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scholarflow_tasks.json");

        let store = TaskStore::load(Arc::new(FileSlot::new(path.clone())));
        let task = store.create(NewTask::titled("problem set", Priority::High));
        store.replace(|tasks| lifecycle::toggle_completion(tasks, &task.id));
        let original = store.snapshot();

        let reloaded = TaskStore::load(Arc::new(FileSlot::new(path)));
        assert_eq!(reloaded.snapshot(), original);
    }

    #[test]
    fn get_finds_by_id() {
        let (store, _slot) = store_with_slot();
        let task = store.create(NewTask::titled("notes", Priority::Low));
        assert_eq!(store.get(&task.id).unwrap().title, "notes");
        assert!(store.get("missing").is_none());
    }
}
