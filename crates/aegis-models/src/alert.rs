//! Operator-facing alert records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;

/// Severity as surfaced to an operator console, distinct from `RiskLevel`
/// so the alert surface can evolve independently of the scoring scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Info,
    Warning,
    High,
    Critical,
}

impl From<RiskLevel> for AlertLevel {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => AlertLevel::Info,
            RiskLevel::Medium => AlertLevel::Warning,
            RiskLevel::High => AlertLevel::High,
            RiskLevel::Critical => AlertLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub event_id: String,
    pub track_id: u64,
    pub frame_id: u64,
    pub level: AlertLevel,
    pub score: f64,
    pub reason: String,
    pub zone: Option<String>,
    pub factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
