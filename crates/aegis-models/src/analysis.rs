//! Per-frame, per-identity analysis snapshot.

use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorFlags;
use crate::motion::MotionState;
use crate::track::BoundingBox;

/// Immutable per-frame snapshot combining identity, motion, and behavior.
///
/// Produced once per identity per frame by the analysis stage and consumed
/// read-only by everything downstream (risk, triggers, fusion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    pub track_id: u64,
    pub class_id: u32,
    pub class_name: String,
    pub motion: MotionState,
    pub behavior: BehaviorFlags,
    pub history_length: usize,
    pub time_tracked: f64,
    pub current_position: (f64, f64),
    pub current_bbox: BoundingBox,
}
