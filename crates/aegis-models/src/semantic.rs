//! Semantic (VLM-backed) enrichment types: triggers, cache entries, fused output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::track::BoundingBox;

/// Why a semantic lookup was requested for an identity.
///
/// Ordered by descending priority: a `UserQuery` always preempts a
/// `RiskThreshold` trigger, which always preempts a `BehaviorChange` trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    BehaviorChange,
    RiskThreshold,
    UserQuery,
}

impl TriggerType {
    /// Higher is more urgent; used to break ties when multiple triggers
    /// fire for the same identity in the same frame.
    pub fn priority(&self) -> u8 {
        match self {
            TriggerType::BehaviorChange => 0,
            TriggerType::RiskThreshold => 1,
            TriggerType::UserQuery => 2,
        }
    }
}

/// A request to run a semantic (VLM) lookup on one identity's current crop.
///
/// `cropped_frame` is the raw pixel crop used for the lookup; it is never
/// serialized (too large, and meaningless once the frame buffer is gone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub track_id: u64,
    pub frame_id: u64,
    pub trigger_type: TriggerType,
    pub bbox: BoundingBox,
    pub prompt: String,
    pub image_hash: String,
    pub crop_width: u32,
    pub crop_height: u32,
    #[serde(skip)]
    pub cropped_frame: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Result of a completed semantic lookup for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticDetection {
    pub track_id: u64,
    pub frame_id: u64,
    pub label: String,
    pub confidence: f64,
    pub description: String,
    pub matched_phrase: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// A cached semantic result keyed by `(prompt_text, image_hash)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptCacheEntry {
    pub prompt_text: String,
    pub image_hash: String,
    pub detections: Vec<SemanticDetection>,
    pub inserted_at: DateTime<Utc>,
    pub hits: u32,
}

/// One identity's fully fused view: latest motion/behavior plus, if any
/// semantic lookup has ever resolved for it, the highest-confidence match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedObject {
    pub track_id: u64,
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub risk_score: f64,
    pub active_behaviors: Vec<String>,
    pub semantic_label: Option<String>,
    pub semantic_confidence: Option<f64>,
    pub matched_phrase: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl UnifiedObject {
    /// Round float fields to 3 decimals, matching the serialization
    /// precision used for wire/log output.
    pub fn rounded(mut self) -> Self {
        let round3 = |v: f64| (v * 1000.0).round() / 1000.0;
        self.confidence = round3(self.confidence);
        self.risk_score = round3(self.risk_score);
        self.semantic_confidence = self.semantic_confidence.map(round3);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_type_priority_ordering() {
        assert!(TriggerType::UserQuery.priority() > TriggerType::RiskThreshold.priority());
        assert!(TriggerType::RiskThreshold.priority() > TriggerType::BehaviorChange.priority());
    }

    #[test]
    fn rounded_truncates_to_three_decimals() {
        let obj = UnifiedObject {
            track_id: 1,
            class_id: 0,
            class_name: "person".to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            risk_score: 0.123456,
            active_behaviors: Vec::new(),
            semantic_label: None,
            semantic_confidence: Some(0.987654),
            matched_phrase: None,
            timestamp: Utc::now(),
        }
        .rounded();
        assert_eq!(obj.risk_score, 0.123);
        assert_eq!(obj.semantic_confidence, Some(0.988));
    }
}
