//! Periodic tick that accumulates time on running tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::TaskStore;
use super::types::Task;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// One tick over the whole list.
///
/// Returns `None` when no task has its timer flag set, so the caller can skip
/// the commit entirely. Completed tasks never accumulate time even when their
/// flag is still set.
pub fn advance_running(tasks: &[Task]) -> Option<Vec<Task>> {
    if !tasks.iter().any(|t| t.is_timer_running) {
        return None;
    }
    let next = tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.is_timer_running && !task.status.is_completed() {
                task.time_spent_seconds += 1;
            }
            task
        })
        .collect();
    Some(next)
}

/// Starts the tick loop on the current runtime.
///
/// The first tick fires one `period` after start. Ticks missed while the
/// runtime was stalled are dropped, not replayed. Commits run on the blocking
/// pool since the slot may touch the filesystem.
pub fn spawn_timer(
    store: Arc<TaskStore>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_timer(store, period, cancel))
}

pub async fn run_timer(store: Arc<TaskStore>, period: Duration, cancel: CancellationToken) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(period_ms = period.as_millis() as u64, "task timer started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let store = store.clone();
                match task::spawn_blocking(move || store.replace_if(advance_running)).await {
                    Ok(true) => debug!("timer tick committed"),
                    Ok(false) => {}
                    Err(err) => warn!(error = %err, "timer tick task failed"),
                }
            }
            () = cancel.cancelled() => {
                info!("task timer stopped");
                return;
            }
        }
    }
}
