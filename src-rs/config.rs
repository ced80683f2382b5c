use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::DEFAULT_GEMINI_MODEL;
use crate::task::DEFAULT_SLOT_KEY;

#[derive(Clone, Debug)]
pub struct FlowConfig {
    pub storage_path: PathBuf,
    pub persist: bool,
    pub tick_interval: Duration,
    pub model: String,
    pub temperature: f64,
    pub port: u16,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(format!("{}.json", DEFAULT_SLOT_KEY)),
            persist: true,
            tick_interval: Duration::from_millis(1000),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.3,
            port: 8080,
        }
    }
}

impl FlowConfig {
    /// Defaults overridden by `SCHOLARFLOW_*` variables and `PORT`.
    /// Unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            storage_path: env_opt("SCHOLARFLOW_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            persist: env_parse("SCHOLARFLOW_PERSIST", defaults.persist),
            tick_interval: Duration::from_millis(env_parse(
                "SCHOLARFLOW_TICK_MS",
                defaults.tick_interval.as_millis() as u64,
            )),
            model: env_opt("SCHOLARFLOW_MODEL").unwrap_or(defaults.model),
            temperature: env_parse("SCHOLARFLOW_TEMPERATURE", defaults.temperature),
            port: env_parse("PORT", defaults.port),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    env_opt(key)
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(fallback)
}
