//! State transitions on the task list.
//!
//! Every function here is pure: it reads the current list and returns the next
//! one. Only the task with the matching id is touched, and an unknown id hands
//! back an unchanged copy.

use super::types::{Task, TaskStatus};

/// Prepends `task` so the newest task comes first.
pub fn create(tasks: &[Task], task: Task) -> Vec<Task> {
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(task);
    next.extend_from_slice(tasks);
    next
}

pub fn delete(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Completed flips back to Todo, anything else flips to Completed.
///
/// Leaving Completed never restores In Progress. Entering Completed stops the
/// timer; leaving it keeps whatever timer flag the task already had.
pub fn toggle_completion(tasks: &[Task], id: &str) -> Vec<Task> {
    map_matching(tasks, id, |task| {
        let now_completed = !task.status.is_completed();
        task.status = if now_completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Todo
        };
        if now_completed {
            task.is_timer_running = false;
        }
    })
}

/// Several timers may run at the same time; other tasks are left alone.
pub fn toggle_timer(tasks: &[Task], id: &str) -> Vec<Task> {
    map_matching(tasks, id, |task| {
        task.is_timer_running = !task.is_timer_running;
    })
}

pub fn reset_timer(tasks: &[Task], id: &str) -> Vec<Task> {
    map_matching(tasks, id, |task| {
        task.time_spent_seconds = 0;
        task.is_timer_running = false;
    })
}

fn map_matching<F>(tasks: &[Task], id: &str, mut apply: F) -> Vec<Task>
where
    F: FnMut(&mut Task),
{
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.id == id {
                apply(&mut task);
            }
            task
        })
        .collect()
}
