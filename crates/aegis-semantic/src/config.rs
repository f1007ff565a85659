//! Semantic subsystem configuration.

use std::time::Duration;

use crate::error::{SemanticError, SemanticResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticConfig {
    pub enabled: bool,
    pub risk_threshold_trigger: f64,
    pub cache_ttl_seconds: u64,
    pub max_cache_size: usize,
    pub max_concurrent_requests: usize,
    pub trigger_cooldown_seconds: f64,
    pub executor_queue_cap: usize,
    pub shutdown_grace: Duration,
    pub vlm_soft_timeout: Duration,
}

impl SemanticConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("AEGIS_SEMANTIC_ENABLED") {
            if let Ok(v) = v.parse() {
                cfg.enabled = v;
            }
        }
        if let Ok(v) = std::env::var("AEGIS_SEMANTIC_MAX_CONCURRENT_REQUESTS") {
            if let Ok(v) = v.parse() {
                cfg.max_concurrent_requests = v;
            }
        }
        cfg
    }

    pub fn validate(&self) -> SemanticResult<()> {
        if self.max_concurrent_requests == 0 {
            return Err(SemanticError::invalid_config("max_concurrent_requests must be > 0"));
        }
        if self.executor_queue_cap == 0 {
            return Err(SemanticError::invalid_config("executor_queue_cap must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.risk_threshold_trigger) {
            return Err(SemanticError::invalid_config("risk_threshold_trigger must be in [0,1]"));
        }
        if self.trigger_cooldown_seconds < 0.0 {
            return Err(SemanticError::invalid_config("trigger_cooldown_seconds must be >= 0"));
        }
        Ok(())
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            risk_threshold_trigger: 0.6,
            cache_ttl_seconds: 300,
            max_cache_size: 1000,
            max_concurrent_requests: 2,
            trigger_cooldown_seconds: 2.0,
            executor_queue_cap: 32,
            shutdown_grace: Duration::from_secs(5),
            vlm_soft_timeout: Duration::from_secs(3),
        }
    }
}
