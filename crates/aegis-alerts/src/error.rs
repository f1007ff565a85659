//! Error types for alert management.

use thiserror::Error;

pub type AlertResult<T> = Result<T, AlertError>;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("invalid alert config: {0}")]
    InvalidConfig(String),

    #[error("alert sink unwritable: {0}")]
    SinkUnwritable(String),

    #[error("failed to serialize alert: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AlertError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
