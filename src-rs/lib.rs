pub mod app;
pub mod config;
pub mod error;
pub mod helpers;
pub mod result;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "task/lib.rs"]
pub mod task;
#[path = "advisor/lib.rs"]
pub mod advisor;
#[path = "api/lib.rs"]
pub mod api;

pub use app::ScholarFlow;
pub use config::FlowConfig;
pub use error::{FlowError, StoreError};
pub use result::PrioritizeResult;
