use std::sync::Arc;

use tracing::{info, warn};

use crate::advisor::AdvisorGateway;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::llm::{is_allowed_model, keys_from_env, GeminiAdapter, GeminiConfig};
use crate::task::{FileSlot, MemorySlot, StorageSlot};

pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

pub fn load_gemini_keys() -> Vec<String> {
    keys_from_env(GEMINI_KEY_VAR)
}

pub fn build_slot(cfg: &FlowConfig) -> Arc<dyn StorageSlot> {
    if cfg.persist {
        info!(path = %cfg.storage_path.display(), "persisting tasks to file");
        Arc::new(FileSlot::new(cfg.storage_path.clone()))
    } else {
        info!("persistence disabled, tasks live in memory");
        Arc::new(MemorySlot::new())
    }
}

/// Gemini-backed advisor. Missing keys are not fatal: prioritization then
/// reports an `auth_error` and leaves the tasks alone.
pub fn build_advisor(cfg: &FlowConfig) -> Result<AdvisorGateway, FlowError> {
    if !(0.0..=2.0).contains(&cfg.temperature) {
        return Err(FlowError::Config(format!(
            "temperature out of range: {}",
            cfg.temperature
        )));
    }
    if !is_allowed_model(&cfg.model) {
        return Err(FlowError::Config(format!("unsupported model: {}", cfg.model)));
    }
    let api_keys = load_gemini_keys();
    if api_keys.is_empty() {
        warn!("no {} found, AI prioritization will fail", GEMINI_KEY_VAR);
    }
    let adapter = GeminiAdapter::new(GeminiConfig {
        api_keys,
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        ..GeminiConfig::default()
    })?;
    Ok(AdvisorGateway::new(Arc::new(adapter)).with_model(&cfg.model, cfg.temperature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_persistence_uses_memory_slot() {
        let cfg = FlowConfig {
            persist: false,
            ..FlowConfig::default()
        };
        let slot = build_slot(&cfg);
        slot.write("[]").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let cfg = FlowConfig {
            temperature: 7.5,
            ..FlowConfig::default()
        };
        assert!(matches!(build_advisor(&cfg), Err(FlowError::Config(_))));
    }

    #[test]
    fn unknown_model_is_rejected_at_startup() {
        let cfg = FlowConfig {
            model: "gemini-1.0-ultra".to_string(),
            ..FlowConfig::default()
        };
        match build_advisor(&cfg) {
            Err(FlowError::Config(message)) => assert!(message.contains("gemini-1.0-ultra")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn default_config_builds_an_advisor() {
        assert!(build_advisor(&FlowConfig::default()).is_ok());
    }
}
