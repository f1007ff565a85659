//! Analysis-stage configuration.

use crate::error::{AnalysisError, AnalysisResult};

/// Tunables for history, motion, behavior, and crowd analysis.
///
/// Constructed once at pipeline startup; never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub history_window_size: usize,
    pub stale_threshold: u64,
    pub min_history_for_analysis: usize,
    pub stationary_speed_threshold: f64,
    pub running_speed_threshold: f64,
    pub loitering_time_threshold: f64,
    pub speed_change_threshold: f64,
    pub speed_change_window: usize,
    pub direction_reversal_threshold: f64,
    pub erratic_variance_threshold: f64,
    pub grid_cell_size: f64,
    pub crowd_density_threshold: u32,
    pub assumed_fps: f64,
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("AEGIS_HISTORY_WINDOW_SIZE") {
            if let Ok(v) = v.parse() {
                cfg.history_window_size = v;
            }
        }
        if let Ok(v) = std::env::var("AEGIS_STALE_THRESHOLD") {
            if let Ok(v) = v.parse() {
                cfg.stale_threshold = v;
            }
        }
        if let Ok(v) = std::env::var("AEGIS_ASSUMED_FPS") {
            if let Ok(v) = v.parse() {
                cfg.assumed_fps = v;
            }
        }
        cfg
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.history_window_size == 0 {
            return Err(AnalysisError::invalid_config("history_window_size must be > 0"));
        }
        if self.assumed_fps <= 0.0 {
            return Err(AnalysisError::invalid_config("assumed_fps must be > 0"));
        }
        if self.speed_change_window == 0 {
            return Err(AnalysisError::invalid_config("speed_change_window must be > 0"));
        }
        if self.grid_cell_size <= 0.0 {
            return Err(AnalysisError::invalid_config("grid_cell_size must be > 0"));
        }
        Ok(())
    }

    /// Motion analysis window K, bounded by the configured history window.
    pub fn motion_window(&self) -> usize {
        5.min(self.history_window_size.max(1))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_window_size: 30,
            stale_threshold: 90,
            min_history_for_analysis: 3,
            stationary_speed_threshold: 2.0,
            running_speed_threshold: 10.0,
            loitering_time_threshold: 5.0,
            speed_change_threshold: 5.0,
            speed_change_window: 5,
            direction_reversal_threshold: 2.4,
            erratic_variance_threshold: 1.0,
            grid_cell_size: 100.0,
            crowd_density_threshold: 5,
            assumed_fps: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.history_window_size = 0;
        assert!(cfg.validate().is_err());
    }
}
