use serde::{Deserialize, Serialize};

/// Outcome of one prioritization round trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PrioritizeResult {
    Applied { suggestions: usize, updated: usize },
    NothingToPrioritize,
    AlreadyRunning,
    Failed { error: String },
}

