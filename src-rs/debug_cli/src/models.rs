use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub filter: String,
    pub subject: Option<String>,
    pub debug: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub deadline: String,
    pub priority: String,
    pub estimated_hours: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub deadline: String,
    pub priority: String,
    pub status: String,
    pub ai_reasoning: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: u64,
    #[serde(default)]
    pub is_timer_running: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsInfo {
    pub total: usize,
    pub completed_count: usize,
    pub completion_rate: u32,
    pub total_time: String,
}

#[derive(Debug, Deserialize)]
pub struct PrioritizeInfo {
    pub outcome: String,
    pub suggestions: Option<usize>,
    pub updated: Option<usize>,
    pub error: Option<String>,
}
