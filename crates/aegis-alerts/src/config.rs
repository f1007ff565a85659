//! Alert manager configuration.

use std::path::PathBuf;

use aegis_models::AlertLevel;

use crate::error::{AlertError, AlertResult};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertManagerConfig {
    pub enabled: bool,
    pub min_level: AlertLevel,
    pub cooldown_seconds: f64,
    pub log_to_file: bool,
    pub log_path: Option<PathBuf>,
}

impl AlertManagerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("AEGIS_ALERT_COOLDOWN_SECONDS") {
            if let Ok(v) = v.parse() {
                cfg.cooldown_seconds = v;
            }
        }
        if let Ok(v) = std::env::var("AEGIS_ALERT_LOG_PATH") {
            cfg.log_to_file = true;
            cfg.log_path = Some(PathBuf::from(v));
        }
        cfg
    }

    pub fn validate(&self) -> AlertResult<()> {
        if self.cooldown_seconds < 0.0 {
            return Err(AlertError::invalid_config("cooldown_seconds must be >= 0"));
        }
        if self.log_to_file && self.log_path.is_none() {
            return Err(AlertError::invalid_config("log_to_file requires log_path"));
        }
        Ok(())
    }
}

impl Default for AlertManagerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_level: AlertLevel::Warning,
            cooldown_seconds: 10.0,
            log_to_file: false,
            log_path: None,
        }
    }
}

/// Ordering used to compare an alert's level against `min_level`.
pub(crate) fn level_priority(level: AlertLevel) -> u8 {
    match level {
        AlertLevel::Info => 0,
        AlertLevel::Warning => 1,
        AlertLevel::High => 2,
        AlertLevel::Critical => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(AlertManagerConfig::default().validate().is_ok());
    }

    #[test]
    fn log_to_file_without_path_is_rejected() {
        let mut config = AlertManagerConfig::default();
        config.log_to_file = true;
        assert!(config.validate().is_err());
    }
}
