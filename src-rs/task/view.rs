use serde::{Deserialize, Serialize};

use super::types::{Task, TaskStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Status(TaskStatus),
}

impl TaskFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        TaskStatus::parse(raw).map(Self::Status)
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => task.status == status,
        }
    }
}

/// Tasks passing `filter`, open tasks before completed ones, then by
/// priority from High to Low. Ties keep store order.
pub fn visible_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    visible.sort_by_key(|t| (t.status.is_completed(), t.priority.rank()));
    visible
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed_count: usize,
    pub completion_rate: u32,
    pub total_time_seconds: u64,
    pub total_time: String,
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let completed_count = tasks.iter().filter(|t| t.status.is_completed()).count();
    let total_time_seconds = tasks.iter().map(|t| t.time_spent_seconds).sum();
    TaskStats {
        total: tasks.len(),
        completed_count,
        completion_rate: completion_rate(completed_count, tasks.len()),
        total_time_seconds,
        total_time: format_total_time(total_time_seconds),
    }
}

fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Renders whole hours and minutes, e.g. `"2h 5m"`. Seconds are dropped.
pub fn format_total_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}
