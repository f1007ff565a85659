//! Named behavior flags derived from motion state and raw position history.

use std::collections::HashMap;

use aegis_models::{BehaviorFlags, MotionState, TrackHistory};

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy)]
struct TrackBehaviorState {
    stationary_since: Option<f64>,
}

/// Stateful only in the minimal sense the spec requires: it remembers, per
/// identity, the timestamp a stationary run began so `stationary_duration`
/// survives across frames. Evicted identities must be purged with [`Self::evict`].
#[derive(Debug, Default)]
pub struct BehaviorAnalyzer {
    state: HashMap<u64, TrackBehaviorState>,
}

impl BehaviorAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evict(&mut self, track_id: u64) {
        self.state.remove(&track_id);
    }

    pub fn analyze(
        &mut self,
        config: &AnalysisConfig,
        track_id: u64,
        history: &TrackHistory,
        motion: &MotionState,
        now_t: f64,
    ) -> BehaviorFlags {
        if history.len() < config.min_history_for_analysis {
            return BehaviorFlags::none();
        }

        let entry = self.state.entry(track_id).or_insert(TrackBehaviorState { stationary_since: None });
        if motion.is_stationary {
            entry.stationary_since.get_or_insert(now_t);
        } else {
            entry.stationary_since = None;
        }
        let stationary_duration = entry.stationary_since.map(|since| (now_t - since).max(0.0)).unwrap_or(0.0);
        let is_loitering = motion.is_stationary && stationary_duration >= config.loitering_time_threshold;
        let is_running = motion.smoothed_speed > config.running_speed_threshold;

        let directions = step_directions(history, config.motion_window().max(config.speed_change_window + 1));
        let speeds = step_speeds(history, config, directions.len());

        let sudden_speed_change = speed_delta_exceeds(&speeds, config.speed_change_window, config.speed_change_threshold);
        let direction_reversal = direction_jump_exceeds(&directions, config.direction_reversal_threshold);
        let direction_variance = circular_variance(&directions);
        let is_erratic = direction_variance > config.erratic_variance_threshold;

        BehaviorFlags {
            is_stationary: motion.is_stationary,
            is_loitering,
            is_running,
            sudden_speed_change,
            direction_reversal,
            is_erratic,
            stationary_duration,
            direction_variance,
        }
    }
}

/// Instantaneous direction (`atan2`) between each consecutive pair in the
/// last `window + 1` samples of `history`.
fn step_directions(history: &TrackHistory, window: usize) -> Vec<f64> {
    let samples = history.last_n(window + 1);
    samples
        .windows(2)
        .map(|pair| (pair[1].y - pair[0].y).atan2(pair[1].x - pair[0].x))
        .collect()
}

fn step_speeds(history: &TrackHistory, config: &AnalysisConfig, window: usize) -> Vec<f64> {
    let samples = history.last_n(window + 1);
    samples
        .windows(2)
        .map(|pair| {
            let dt = pair[1].t - pair[0].t;
            let dt = if dt <= 0.0 { 1.0 / config.assumed_fps } else { dt };
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            (dx * dx + dy * dy).sqrt() / dt
        })
        .collect()
}

/// `|speed_now - speed_{t-w}| > threshold` within a `w`-frame window.
fn speed_delta_exceeds(speeds: &[f64], w: usize, threshold: f64) -> bool {
    if speeds.len() <= w {
        return false;
    }
    let now = speeds[speeds.len() - 1];
    let past = speeds[speeds.len() - 1 - w];
    (now - past).abs() > threshold
}

/// Signed angular change between the earliest and latest direction in the window.
fn direction_jump_exceeds(directions: &[f64], threshold: f64) -> bool {
    if directions.len() < 2 {
        return false;
    }
    let first = directions[0];
    let last = *directions.last().unwrap();
    angular_diff(first, last).abs() > threshold
}

/// Shortest signed angle from `a` to `b`, wrapped into `(-pi, pi]`.
fn angular_diff(a: f64, b: f64) -> f64 {
    let mut diff = b - a;
    while diff > std::f64::consts::PI {
        diff -= 2.0 * std::f64::consts::PI;
    }
    while diff <= -std::f64::consts::PI {
        diff += 2.0 * std::f64::consts::PI;
    }
    diff
}

/// `1 - R` where `R` is the mean resultant length of the direction series.
fn circular_variance(directions: &[f64]) -> f64 {
    if directions.is_empty() {
        return 0.0;
    }
    let n = directions.len() as f64;
    let sum_cos: f64 = directions.iter().map(|d| d.cos()).sum();
    let sum_sin: f64 = directions.iter().map(|d| d.sin()).sum();
    let r = ((sum_cos / n).powi(2) + (sum_sin / n).powi(2)).sqrt();
    (1.0 - r).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::PositionRecord;

    fn history_with(points: &[(f64, f64, f64)]) -> TrackHistory {
        let mut iter = points.iter();
        let (x0, y0, t0) = iter.next().unwrap();
        let mut history = TrackHistory::new(60, PositionRecord { x: *x0, y: *y0, frame_id: 0, t: *t0 });
        for (i, (x, y, t)) in iter.enumerate() {
            history.push(PositionRecord { x: *x, y: *y, frame_id: (i + 1) as u64, t: *t });
        }
        history
    }

    #[test]
    fn loitering_requires_sustained_stationary_duration() {
        let config = AnalysisConfig::default();
        let mut analyzer = BehaviorAnalyzer::new();
        let points: Vec<(f64, f64, f64)> = (0..180).map(|i| (100.0, 100.0, i as f64 / 30.0)).collect();
        let history = history_with(&points);
        let motion = MotionState { speed: 0.0, smoothed_speed: 0.0, velocity: (0.0, 0.0), direction: 0.0, acceleration: 0.0, is_stationary: true };

        let mut last_flags = BehaviorFlags::none();
        for i in 0..points.len() {
            last_flags = analyzer.analyze(&config, 1, &history, &motion, points[i].2);
        }
        assert!(last_flags.is_loitering);
        assert!(last_flags.stationary_duration >= config.loitering_time_threshold);
    }

    #[test]
    fn direction_reversal_detected_on_sharp_turn() {
        let directions = vec![0.0, 0.1, std::f64::consts::PI];
        assert!(direction_jump_exceeds(&directions, 2.4));
    }

    #[test]
    fn circular_variance_is_zero_for_constant_direction() {
        let directions = vec![0.5, 0.5, 0.5, 0.5];
        assert!(circular_variance(&directions) < 1e-9);
    }
}
