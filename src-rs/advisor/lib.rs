pub mod gateway;
pub mod prompt;

pub use gateway::{merge_suggestions, AdvisorGateway};
pub use prompt::{build_request, parse_suggestions, suggestion_schema};
