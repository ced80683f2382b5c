pub mod lifecycle;
pub mod slot;
pub mod store;
pub mod timer;
pub mod types;
pub mod view;

pub use slot::{FileSlot, MemorySlot, StorageSlot, DEFAULT_SLOT_KEY};
pub use store::TaskStore;
pub use timer::{advance_running, spawn_timer, DEFAULT_TICK};
pub use types::{AiSuggestion, NewTask, Priority, Task, TaskStatus};
pub use view::{format_total_time, stats, visible_tasks, TaskFilter, TaskStats};
