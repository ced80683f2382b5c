use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};

use super::prompt::{build_request, parse_suggestions};
use crate::llm::{ProviderAdapter, ProviderError};
use crate::result::PrioritizeResult;
use crate::task::{AiSuggestion, Task, TaskStore};

/// Sends open tasks to the suggestion service and merges the answer back.
///
/// At most one round trip is in flight; the processing flag is raised for
/// its duration and lowered on every exit path.
pub struct AdvisorGateway {
    provider: Arc<dyn ProviderAdapter>,
    model: Option<String>,
    temperature: Option<f64>,
    processing: AtomicBool,
}

impl AdvisorGateway {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            provider,
            model: None,
            temperature: None,
            processing: AtomicBool::new(false),
        }
    }

    pub fn with_model(mut self, model: &str, temperature: f64) -> Self {
        self.model = Some(model.to_string());
        self.temperature = Some(temperature);
        self
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub async fn suggest(&self, tasks: &[Task]) -> Result<Vec<AiSuggestion>, ProviderError> {
        let request = build_request(tasks, self.model.clone(), self.temperature)?;
        let response = self.provider.complete(request).await?;
        parse_suggestions(&response.content)
    }

    pub async fn run_prioritize(&self, store: &Arc<TaskStore>) -> PrioritizeResult {
        let active: Vec<Task> = store
            .snapshot()
            .into_iter()
            .filter(|t| !t.status.is_completed())
            .collect();
        if active.is_empty() {
            return PrioritizeResult::NothingToPrioritize;
        }

        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            return PrioritizeResult::AlreadyRunning;
        };

        info!(tasks = active.len(), "requesting priority suggestions");
        let suggestions = match self.suggest(&active).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(code = %err.code, error = %err.message, "priority advisor failed");
                return PrioritizeResult::Failed {
                    error: err.to_string(),
                };
            }
        };

        let count = suggestions.len();
        let store = store.clone();
        let commit = task::spawn_blocking(move || {
            let mut updated = 0;
            store.replace(|tasks| {
                updated = tasks
                    .iter()
                    .filter(|t| suggestions.iter().any(|s| s.task_id == t.id))
                    .count();
                merge_suggestions(tasks, &suggestions)
            });
            updated
        });
        match commit.await {
            Ok(updated) => {
                info!(suggestions = count, updated, "priority suggestions merged");
                PrioritizeResult::Applied {
                    suggestions: count,
                    updated,
                }
            }
            Err(err) => {
                warn!(error = %err, "merging priority suggestions failed");
                PrioritizeResult::Failed {
                    error: format!("merge failed: {}", err),
                }
            }
        }
    }
}

/// Applies the first suggestion matching each task's id. Suggestions for ids
/// not in `tasks` are dropped; tasks without one are unchanged.
pub fn merge_suggestions(tasks: &[Task], suggestions: &[AiSuggestion]) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if let Some(suggestion) = suggestions.iter().find(|s| s.task_id == task.id) {
                task.priority = suggestion.suggested_priority;
                task.ai_reasoning = Some(suggestion.reasoning.clone());
            }
            task
        })
        .collect()
}

struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
