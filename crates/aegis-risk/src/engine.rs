//! Weighted multi-signal risk scoring with temporal smoothing.

use std::collections::HashMap;

use aegis_models::{CrowdMetrics, Explanation, Factor, FrameRiskSummary, RiskLevel, RiskScore, TrackAnalysis};

use crate::config::RiskEngineConfig;
use crate::error::RiskResult;
use crate::zone::ZoneManager;

/// Stateful scorer: holds per-identity EMA state across frames.
pub struct RiskEngine {
    config: RiskEngineConfig,
    ema_state: HashMap<u64, f64>,
}

impl RiskEngine {
    pub fn new(config: RiskEngineConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { config, ema_state: HashMap::new() })
    }

    pub fn config(&self) -> &RiskEngineConfig {
        &self.config
    }

    /// Drop temporal state for an identity no longer tracked.
    pub fn evict(&mut self, track_id: u64) {
        self.ema_state.remove(&track_id);
    }

    /// Score every analysis, producing a frame-level summary. Order within
    /// `track_risks` matches `analyses`.
    pub fn compute_frame_risks(
        &mut self,
        analyses: &[TrackAnalysis],
        crowd: &CrowdMetrics,
        zones: &ZoneManager,
        frame_id: u64,
        t: f64,
    ) -> FrameRiskSummary {
        let track_risks = analyses.iter().map(|a| self.score_track(a, crowd, zones)).collect();
        FrameRiskSummary::from_scores(frame_id, t, track_risks)
    }

    /// Score a single identity, applying and updating temporal smoothing.
    pub fn score_track(&mut self, analysis: &TrackAnalysis, crowd: &CrowdMetrics, zones: &ZoneManager) -> RiskScore {
        let factors = self.build_factors(analysis, crowd, zones);
        let raw_score = factors.iter().map(|f| f.contribution).sum::<f64>().clamp(0.0, 1.0);
        let score = self.smooth(analysis.track_id, raw_score);
        let level = RiskLevel::from_score(
            score,
            self.config.thresholds.medium,
            self.config.thresholds.high,
            self.config.thresholds.critical,
        );
        let explanation = Explanation::new(factors);
        RiskScore::new(analysis.track_id, score, raw_score, level, explanation)
    }

    fn smooth(&mut self, track_id: u64, raw_score: f64) -> f64 {
        if !self.config.temporal.enabled {
            self.ema_state.insert(track_id, raw_score);
            return raw_score;
        }
        let prev = self.ema_state.get(&track_id).copied().unwrap_or(raw_score);
        let next = if raw_score > prev {
            prev + self.config.temporal.escalation_rate * (raw_score - prev)
        } else {
            prev - self.config.temporal.decay_rate * (prev - raw_score)
        };
        self.ema_state.insert(track_id, next);
        next
    }

    fn build_factors(&self, analysis: &TrackAnalysis, crowd: &CrowdMetrics, zones: &ZoneManager) -> Vec<Factor> {
        let w = self.config.weights;
        let behavior = &analysis.behavior;

        let loitering_raw = if behavior.is_loitering {
            (behavior.stationary_duration / (2.0 * self.config.loitering_time_threshold)).min(1.0)
        } else {
            0.0
        };

        let speed_flagged = behavior.sudden_speed_change || behavior.is_running;
        let accel_term = (analysis.motion.acceleration.abs() / self.config.accel_norm).min(1.0);
        let speed_raw = if speed_flagged { 1.0 } else { accel_term };

        let direction_raw = if behavior.direction_reversal {
            1.0
        } else {
            (behavior.direction_variance / self.config.erratic_variance_threshold).min(1.0)
        };

        let local_density = crowd.density_at(
            analysis.current_position.0,
            analysis.current_position.1,
            self.config.grid_cell_size,
        );
        let crowd_raw = (local_density as f64 / self.config.crowd_density_threshold as f64).min(1.0);

        let zone_raw = if self.config.use_zones {
            zones.risk_weight_at(analysis.current_position)
        } else {
            0.0
        };

        let erratic_raw = if behavior.is_erratic {
            1.0
        } else {
            (behavior.direction_variance / (2.0 * self.config.erratic_variance_threshold)).min(1.0)
        };

        vec![
            factor("loitering", "Loitering", "Sustained loitering detected", loitering_raw, w.loitering),
            factor("speed_anomaly", "Speed anomaly", "Sudden speed change detected", speed_raw, w.speed),
            factor("direction_change", "Direction change", "Sharp direction reversal detected", direction_raw, w.direction),
            factor("crowd_density", "Crowd density", "High crowd density nearby", crowd_raw, w.crowd),
            factor("zone_context", "Zone context", "Located in a weighted zone", zone_raw, w.zone),
            factor("erratic_motion", "Erratic motion", "Erratic motion pattern detected", erratic_raw, w.erratic),
        ]
    }
}

fn factor(name: &str, display_name: &str, description: &str, raw_value: f64, weight: f64) -> Factor {
    Factor {
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        raw_value,
        weight,
        contribution: raw_value * weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::{BehaviorFlags, BoundingBox, MotionState};

    fn base_analysis(track_id: u64) -> TrackAnalysis {
        TrackAnalysis {
            track_id,
            class_id: 0,
            class_name: String::new(),
            motion: MotionState::zero(),
            behavior: BehaviorFlags::none(),
            history_length: 10,
            time_tracked: 1.0,
            current_position: (10.0, 10.0),
            current_bbox: BoundingBox::new(5.0, 5.0, 15.0, 15.0),
        }
    }

    #[test]
    fn score_stays_within_unit_interval() {
        let mut engine = RiskEngine::new(RiskEngineConfig::default()).unwrap();
        let mut analysis = base_analysis(1);
        analysis.behavior = BehaviorFlags {
            is_stationary: true,
            is_loitering: true,
            is_running: true,
            sudden_speed_change: true,
            direction_reversal: true,
            is_erratic: true,
            stationary_duration: 100.0,
            direction_variance: 10.0,
        };
        let score = engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        assert!(score.score >= 0.0 && score.score <= 1.0);
    }

    #[test]
    fn normal_behavior_yields_normal_summary() {
        let mut engine = RiskEngine::new(RiskEngineConfig::default()).unwrap();
        let analysis = base_analysis(1);
        let score = engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        assert_eq!(score.explanation.summary, "Normal behavior.");
        assert_eq!(score.level, RiskLevel::Low);
    }

    #[test]
    fn temporal_smoothing_escalates_gradually() {
        let mut engine = RiskEngine::new(RiskEngineConfig::default()).unwrap();
        let mut analysis = base_analysis(1);
        analysis.behavior.is_erratic = true;
        analysis.behavior.direction_variance = 5.0;

        let first = engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        let second = engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        assert!(second.score >= first.score);
        assert!(second.score <= second.raw_score.max(first.score + 1e-9));
    }

    #[test]
    fn eviction_resets_temporal_state() {
        let mut engine = RiskEngine::new(RiskEngineConfig::default()).unwrap();
        let mut analysis = base_analysis(1);
        analysis.behavior.is_erratic = true;
        analysis.behavior.direction_variance = 5.0;
        engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        engine.evict(1);
        assert!(!engine.ema_state.contains_key(&1));
    }

    #[test]
    fn explanation_factors_are_sorted_for_determinism() {
        let mut engine = RiskEngine::new(RiskEngineConfig::default()).unwrap();
        let analysis = base_analysis(1);
        let score = engine.score_track(&analysis, &CrowdMetrics::empty(), &ZoneManager::empty());
        let names: Vec<&str> = score.explanation.factors.iter().map(|f| f.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
