pub mod gemini_adapter;
pub mod keys;
pub mod types;

pub use gemini_adapter::{is_allowed_model, GeminiAdapter, GeminiConfig, DEFAULT_GEMINI_MODEL};
pub use keys::{keys_from_env, KeyRing};
pub use types::{CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError};
