//! Weighted multi-signal risk scoring with temporal smoothing and deterministic
//! explanations for the Aegis pipeline.

pub mod config;
pub mod engine;
pub mod error;
pub mod zone;

pub use config::{RiskEngineConfig, RiskThresholds, RiskWeights, TemporalConfig};
pub use engine::RiskEngine;
pub use error::{RiskError, RiskResult};
pub use zone::{Zone, ZoneManager};
