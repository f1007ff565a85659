//! Error types for the risk engine.

use thiserror::Error;

pub type RiskResult<T> = Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("invalid risk config: {0}")]
    InvalidConfig(String),
}

impl RiskError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
