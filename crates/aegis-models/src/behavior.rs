//! Named behavioral flags derived from motion + history.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFlags {
    pub is_stationary: bool,
    pub is_loitering: bool,
    pub is_running: bool,
    pub sudden_speed_change: bool,
    pub direction_reversal: bool,
    pub is_erratic: bool,
    /// Seconds since the track first went stationary, 0 if not stationary.
    pub stationary_duration: f64,
    /// Circular variance of direction over the analysis window.
    pub direction_variance: f64,
}

impl BehaviorFlags {
    pub fn none() -> Self {
        Self {
            is_stationary: false,
            is_loitering: false,
            is_running: false,
            sudden_speed_change: false,
            direction_reversal: false,
            is_erratic: false,
            stationary_duration: 0.0,
            direction_variance: 0.0,
        }
    }

    /// Any flag that an operator would consider anomalous.
    pub fn has_anomaly(&self) -> bool {
        self.is_loitering || self.sudden_speed_change || self.direction_reversal || self.is_erratic
    }
}

impl Default for BehaviorFlags {
    fn default() -> Self {
        Self::none()
    }
}
