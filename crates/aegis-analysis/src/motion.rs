//! Speed, direction, acceleration, and smoothing from position history.

use aegis_models::{MotionState, PositionRecord, TrackHistory};

use crate::config::AnalysisConfig;

/// Stateless, deterministic derivation of [`MotionState`] from a history window.
pub struct MotionAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> MotionAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze the last `min(K, history.len())` samples of `history`.
    pub fn analyze(&self, history: &TrackHistory) -> MotionState {
        if history.len() < self.config.min_history_for_analysis {
            return MotionState::zero();
        }

        let window = history.last_n(self.config.motion_window());
        if window.len() < 2 {
            return MotionState::zero();
        }

        let instantaneous: Vec<(f64, f64, f64)> = window
            .windows(2)
            .map(|pair| self.step(&pair[0], &pair[1]))
            .collect();

        let speeds: Vec<f64> = instantaneous.iter().map(|(speed, _, _)| *speed).collect();
        let smoothed_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;

        let (speed, direction, dt_last) = *instantaneous.last().expect("window has >= 1 step");
        let speed_prev = if instantaneous.len() >= 2 {
            instantaneous[instantaneous.len() - 2].0
        } else {
            speed
        };
        let acceleration = (speed - speed_prev) / dt_last;
        let velocity = self.velocity(&window[window.len() - 2], &window[window.len() - 1], dt_last);

        MotionState {
            speed,
            smoothed_speed,
            velocity,
            direction,
            acceleration,
            is_stationary: smoothed_speed < self.config.stationary_speed_threshold,
        }
    }

    /// `(speed, direction, effective_dt)` between two consecutive samples.
    fn step(&self, prev: &PositionRecord, curr: &PositionRecord) -> (f64, f64, f64) {
        let dx = curr.x - prev.x;
        let dy = curr.y - prev.y;
        let dt = self.effective_dt(curr.t - prev.t);
        let distance = (dx * dx + dy * dy).sqrt();
        (distance / dt, dy.atan2(dx), dt)
    }

    fn velocity(&self, prev: &PositionRecord, curr: &PositionRecord, dt: f64) -> (f64, f64) {
        ((curr.x - prev.x) / dt, (curr.y - prev.y) / dt)
    }

    /// Substitute `1/assumed_fps` for a non-positive `Δt`.
    fn effective_dt(&self, dt: f64) -> f64 {
        if dt <= 0.0 {
            1.0 / self.config.assumed_fps
        } else {
            dt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(points: &[(f64, f64, f64)]) -> TrackHistory {
        let mut iter = points.iter();
        let (x0, y0, t0) = iter.next().unwrap();
        let mut history = TrackHistory::new(30, PositionRecord { x: *x0, y: *y0, frame_id: 0, t: *t0 });
        for (i, (x, y, t)) in iter.enumerate() {
            history.push(PositionRecord { x: *x, y: *y, frame_id: (i + 1) as u64, t: *t });
        }
        history
    }

    #[test]
    fn short_history_yields_zero_state() {
        let config = AnalysisConfig::default();
        let analyzer = MotionAnalyzer::new(&config);
        let history = history_with(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0 / 30.0)]);
        let state = analyzer.analyze(&history);
        assert_eq!(state.speed, 0.0);
        assert!(state.is_stationary);
    }

    #[test]
    fn constant_horizontal_motion_is_running() {
        let config = AnalysisConfig::default();
        let analyzer = MotionAnalyzer::new(&config);
        let points: Vec<(f64, f64, f64)> = (0..6).map(|i| (i as f64 * 10.0, 0.0, i as f64 / 30.0)).collect();
        let history = history_with(&points);
        let state = analyzer.analyze(&history);
        assert!(state.speed > config.running_speed_threshold);
        assert!(!state.is_stationary);
        assert!((state.direction - 0.0).abs() < 1e-9);
    }

    #[test]
    fn stationary_point_is_stationary() {
        let config = AnalysisConfig::default();
        let analyzer = MotionAnalyzer::new(&config);
        let points: Vec<(f64, f64, f64)> = (0..6).map(|i| (100.0, 100.0, i as f64 / 30.0)).collect();
        let history = history_with(&points);
        let state = analyzer.analyze(&history);
        assert_eq!(state.speed, 0.0);
        assert!(state.is_stationary);
    }

    #[test]
    fn non_monotonic_timestamp_falls_back_to_assumed_fps() {
        let config = AnalysisConfig::default();
        let analyzer = MotionAnalyzer::new(&config);
        let history = history_with(&[(0.0, 0.0, 0.0), (3.0, 0.0, 0.0)]);
        let state = analyzer.analyze(&history);
        assert_eq!(state.speed, 3.0 * config.assumed_fps);
    }
}
