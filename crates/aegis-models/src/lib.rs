//! Shared data models for the Aegis risk-intelligence pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Upstream track input and bounded position history
//! - Derived motion state and behavioral flags
//! - Crowd density metrics
//! - Per-track analysis snapshots
//! - Risk scoring, explanations, and frame summaries
//! - Operator-facing alerts
//! - Semantic (VLM) triggers, cache entries, and fused objects

pub mod alert;
pub mod analysis;
pub mod behavior;
pub mod crowd;
pub mod motion;
pub mod risk;
pub mod semantic;
pub mod track;

pub use alert::{Alert, AlertLevel};
pub use analysis::TrackAnalysis;
pub use behavior::BehaviorFlags;
pub use crowd::CrowdMetrics;
pub use motion::MotionState;
pub use risk::{Explanation, Factor, FrameRiskSummary, RiskLevel, RiskScore};
pub use semantic::{PromptCacheEntry, SemanticDetection, TriggerEvent, TriggerType, UnifiedObject};
pub use track::{BoundingBox, PositionRecord, Track, TrackHistory};
