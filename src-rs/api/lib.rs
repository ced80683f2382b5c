pub use crate::app::ScholarFlow;
pub use crate::config::FlowConfig;
pub use crate::result::PrioritizeResult;
pub use crate::task::{NewTask, Task, TaskFilter, TaskStats, TaskStatus};

pub mod handlers;
pub mod server;
