//! Pipeline-wide configuration, grouping each stage's config the way the
//! external configuration surface is organized.

use std::time::Duration;

use aegis_alerts::AlertManagerConfig;
use aegis_analysis::AnalysisConfig;
use aegis_risk::RiskEngineConfig;
use aegis_semantic::SemanticConfig;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub analysis: AnalysisConfig,
    pub risk: RiskEngineConfig,
    pub alerts: AlertManagerConfig,
    pub semantic: SemanticConfig,
    pub person_class_id: u32,
    pub vehicle_class_id: u32,
    pub shutdown_grace: Duration,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            analysis: AnalysisConfig::from_env(),
            risk: RiskEngineConfig::from_env(),
            alerts: AlertManagerConfig::from_env(),
            semantic: SemanticConfig::from_env(),
            person_class_id: std::env::var("AEGIS_PERSON_CLASS_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            vehicle_class_id: std::env::var("AEGIS_VEHICLE_CLASS_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            shutdown_grace: Duration::from_secs(
                std::env::var("AEGIS_SHUTDOWN_GRACE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            risk: RiskEngineConfig::default(),
            alerts: AlertManagerConfig::default(),
            semantic: SemanticConfig::default(),
            person_class_id: 0,
            vehicle_class_id: 1,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
