//! Error types for the semantic subsystem.

use thiserror::Error;

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),

    #[error("VLM backend timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("VLM inference failed: {0}")]
    InferenceFailed(String),

    #[error("executor is shutting down")]
    ShuttingDown,
}

impl SemanticError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed(message.into())
    }
}
