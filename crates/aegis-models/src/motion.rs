//! Derived kinematic state. Recomputed every frame; never persisted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    pub speed: f64,
    pub smoothed_speed: f64,
    pub velocity: (f64, f64),
    /// Radians in `(-pi, pi]`.
    pub direction: f64,
    pub acceleration: f64,
    pub is_stationary: bool,
}

impl MotionState {
    /// The motion state for a history too short to analyze.
    pub fn zero() -> Self {
        Self {
            speed: 0.0,
            smoothed_speed: 0.0,
            velocity: (0.0, 0.0),
            direction: 0.0,
            acceleration: 0.0,
            is_stationary: true,
        }
    }
}

impl Default for MotionState {
    fn default() -> Self {
        Self::zero()
    }
}
