use crate::llm::ProviderError;

/// Failures reading or writing the persistence slot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
