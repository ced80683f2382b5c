use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::advisor::AdvisorGateway;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::helpers::{build_advisor, build_slot};
use crate::result::PrioritizeResult;
use crate::task::{lifecycle, spawn_timer, stats, visible_tasks};
use crate::task::{NewTask, Task, TaskFilter, TaskStats, TaskStore};

/// The callback surface the view layer drives: one store, one advisor, and
/// the timer that ticks them.
pub struct ScholarFlow {
    pub config: FlowConfig,
    pub store: Arc<TaskStore>,
    pub advisor: AdvisorGateway,
}

impl ScholarFlow {
    pub fn new(config: FlowConfig) -> Result<Self, FlowError> {
        let store = Arc::new(TaskStore::load(build_slot(&config)));
        let advisor = build_advisor(&config)?;
        Ok(Self::with_parts(config, store, advisor))
    }

    pub fn with_parts(config: FlowConfig, store: Arc<TaskStore>, advisor: AdvisorGateway) -> Self {
        Self {
            config,
            store,
            advisor,
        }
    }

    pub fn start_timer(&self, cancel: CancellationToken) -> JoinHandle<()> {
        spawn_timer(self.store.clone(), self.config.tick_interval, cancel)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.store.snapshot()
    }

    pub fn visible(&self, filter: TaskFilter) -> Vec<Task> {
        visible_tasks(&self.store.snapshot(), filter)
    }

    pub fn stats(&self) -> TaskStats {
        stats(&self.store.snapshot())
    }

    pub fn add_task(&self, new_task: NewTask) -> Task {
        let task = self.store.create(new_task);
        debug!(id = %task.id, "task added");
        task
    }

    /// Returns whether a task was removed.
    pub fn delete_task(&self, id: &str) -> bool {
        let mut removed = false;
        self.store.replace(|tasks| {
            let next = lifecycle::delete(tasks, id);
            removed = next.len() < tasks.len();
            next
        });
        removed
    }

    pub fn toggle_status(&self, id: &str) -> Option<Task> {
        self.apply(id, lifecycle::toggle_completion)
    }

    pub fn toggle_timer(&self, id: &str) -> Option<Task> {
        self.apply(id, lifecycle::toggle_timer)
    }

    pub fn reset_timer(&self, id: &str) -> Option<Task> {
        self.apply(id, lifecycle::reset_timer)
    }

    pub async fn run_ai_prioritize(&self) -> PrioritizeResult {
        self.advisor.run_prioritize(&self.store).await
    }

    pub fn is_ai_processing(&self) -> bool {
        self.advisor.is_processing()
    }

    /// Commits `op` for `id` and hands back the task as committed.
    fn apply<F>(&self, id: &str, op: F) -> Option<Task>
    where
        F: FnOnce(&[Task], &str) -> Vec<Task>,
    {
        self.store
            .replace(|tasks| op(tasks, id))
            .into_iter()
            .find(|t| t.id == id)
    }
}
