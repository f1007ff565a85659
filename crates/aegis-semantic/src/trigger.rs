//! Decides which live identities warrant an expensive semantic lookup this frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;

use aegis_models::{BoundingBox, RiskScore, TrackAnalysis, TriggerEvent, TriggerType};

use crate::config::SemanticConfig;
use crate::phash::{average_hash, Crop};

/// A full decoded video frame, owned by the caller for the duration of one
/// pipeline tick.
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl FrameImage {
    /// Crop to `bbox`, clamped to frame bounds.
    pub fn crop(&self, bbox: &BoundingBox) -> Crop {
        let clamped = bbox.clamp_to_frame(self.width as f64, self.height as f64);
        let x0 = clamped.x1.floor().max(0.0) as u32;
        let y0 = clamped.y1.floor().max(0.0) as u32;
        let x1 = clamped.x2.ceil().min(self.width as f64) as u32;
        let y1 = clamped.y2.ceil().min(self.height as f64) as u32;
        let (w, h) = (x1.saturating_sub(x0).max(1), y1.saturating_sub(y0).max(1));

        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                if x < self.width && y < self.height {
                    let idx = ((y * self.width + x) * 3) as usize;
                    if idx + 3 <= self.rgb.len() {
                        rgb.extend_from_slice(&self.rgb[idx..idx + 3]);
                        continue;
                    }
                }
                rgb.extend_from_slice(&[0, 0, 0]);
            }
        }
        Crop::new(w, h, rgb)
    }
}

/// An active operator query to apply to all live tracks this frame.
pub struct UserQuery {
    pub text: String,
}

/// Stateful only in its per-identity cooldown clock.
#[derive(Default)]
pub struct SemanticTrigger {
    last_triggered: HashMap<u64, Instant>,
}

impl SemanticTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evict(&mut self, track_id: u64) {
        self.last_triggered.remove(&track_id);
    }

    /// Decide trigger events for this frame. Returns an empty list if
    /// `frame` is `None`. At most one `TriggerEvent` per track, chosen by
    /// descending priority: user query > risk threshold > behavior change.
    pub fn decide(
        &mut self,
        config: &SemanticConfig,
        analyses: &[TrackAnalysis],
        risks: &[RiskScore],
        user_query: Option<&UserQuery>,
        frame: Option<&FrameImage>,
        frame_id: u64,
        now: Instant,
    ) -> Vec<TriggerEvent> {
        let Some(frame) = frame else {
            return Vec::new();
        };
        if !config.enabled {
            return Vec::new();
        }

        let risk_by_id: HashMap<u64, f64> = risks.iter().map(|r| (r.track_id, r.score)).collect();
        let cooldown = Duration::from_secs_f64(config.trigger_cooldown_seconds);

        let mut events = Vec::new();
        for analysis in analyses {
            if let Some(last) = self.last_triggered.get(&analysis.track_id) {
                if now.duration_since(*last) < cooldown {
                    continue;
                }
            }

            let decision = self.decide_one(config, analysis, risk_by_id.get(&analysis.track_id).copied(), user_query);
            let Some((trigger_type, prompt)) = decision else {
                continue;
            };

            let crop = frame.crop(&analysis.current_bbox);
            let image_hash = average_hash(&crop);
            events.push(TriggerEvent {
                track_id: analysis.track_id,
                frame_id,
                trigger_type,
                bbox: analysis.current_bbox,
                prompt,
                image_hash,
                crop_width: crop.width,
                crop_height: crop.height,
                cropped_frame: crop.rgb,
                created_at: Utc::now(),
            });
            self.last_triggered.insert(analysis.track_id, now);
        }
        events
    }

    fn decide_one(
        &self,
        config: &SemanticConfig,
        analysis: &TrackAnalysis,
        risk_score: Option<f64>,
        user_query: Option<&UserQuery>,
    ) -> Option<(TriggerType, String)> {
        if let Some(query) = user_query {
            if !query.text.trim().is_empty() {
                return Some((TriggerType::UserQuery, query.text.clone()));
            }
        }
        if risk_score.unwrap_or(0.0) >= config.risk_threshold_trigger {
            return Some((TriggerType::RiskThreshold, "suspicious activity".to_string()));
        }
        if analysis.behavior.has_anomaly() {
            return Some((TriggerType::BehaviorChange, behavior_prompt(analysis)));
        }
        None
    }
}

fn behavior_prompt(analysis: &TrackAnalysis) -> String {
    let b = &analysis.behavior;
    if b.is_loitering {
        "person loitering".to_string()
    } else if b.sudden_speed_change {
        "sudden burst of speed".to_string()
    } else if b.direction_reversal {
        "abrupt change of direction".to_string()
    } else if b.is_erratic {
        "erratic movement".to_string()
    } else {
        "unusual behavior".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::{BehaviorFlags, Explanation, MotionState, RiskLevel};

    fn analysis(track_id: u64, behavior: BehaviorFlags) -> TrackAnalysis {
        TrackAnalysis {
            track_id,
            class_id: 0,
            class_name: String::new(),
            motion: MotionState::zero(),
            behavior,
            history_length: 10,
            time_tracked: 1.0,
            current_position: (50.0, 50.0),
            current_bbox: BoundingBox::new(40.0, 40.0, 60.0, 60.0),
        }
    }

    fn frame() -> FrameImage {
        FrameImage { width: 640, height: 480, rgb: vec![100u8; 640 * 480 * 3] }
    }

    #[test]
    fn no_frame_yields_no_events() {
        let mut trigger = SemanticTrigger::new();
        let events = trigger.decide(&SemanticConfig::default(), &[], &[], None, None, 0, Instant::now());
        assert!(events.is_empty());
    }

    #[test]
    fn user_query_preempts_other_triggers() {
        let mut trigger = SemanticTrigger::new();
        let a = analysis(1, BehaviorFlags { is_loitering: true, ..BehaviorFlags::none() });
        let risk = RiskScore::new(1, 0.8, 0.8, RiskLevel::High, Explanation::new(vec![]));
        let query = UserQuery { text: "red jacket".to_string() };
        let events = trigger.decide(
            &SemanticConfig::default(),
            &[a],
            &[risk],
            Some(&query),
            Some(&frame()),
            0,
            Instant::now(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trigger_type, TriggerType::UserQuery);
        assert_eq!(events[0].prompt, "red jacket");
    }

    #[test]
    fn risk_threshold_preempts_behavior_change() {
        let mut trigger = SemanticTrigger::new();
        let a = analysis(1, BehaviorFlags { is_loitering: true, ..BehaviorFlags::none() });
        let risk = RiskScore::new(1, 0.8, 0.8, RiskLevel::High, Explanation::new(vec![]));
        let events = trigger.decide(&SemanticConfig::default(), &[a], &[risk], None, Some(&frame()), 0, Instant::now());
        assert_eq!(events[0].trigger_type, TriggerType::RiskThreshold);
    }

    #[test]
    fn cooldown_suppresses_retrigger() {
        let mut trigger = SemanticTrigger::new();
        let a = analysis(1, BehaviorFlags { is_loitering: true, ..BehaviorFlags::none() });
        let now = Instant::now();
        let first = trigger.decide(&SemanticConfig::default(), &[a.clone()], &[], None, Some(&frame()), 0, now);
        let second = trigger.decide(&SemanticConfig::default(), &[a], &[], None, Some(&frame()), 1, now);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
