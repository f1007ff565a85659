//! Late fusion of detection, behavior, risk, and semantic match into one
//! per-identity output record.

use std::collections::HashMap;

use chrono::Utc;

use aegis_models::{RiskScore, SemanticDetection, Track, TrackAnalysis, UnifiedObject};

/// Remembers, per identity, the highest-confidence semantic match ever seen.
/// Ties are broken in favor of the one observed first.
#[derive(Debug, Default)]
pub struct SemanticFusion {
    best_matches: HashMap<u64, SemanticDetection>,
}

impl SemanticFusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge freshly completed semantic detections into the running best-match
    /// table, keeping the highest-confidence hit per identity.
    pub fn ingest(&mut self, detections: Vec<SemanticDetection>) {
        for detection in detections {
            match self.best_matches.get(&detection.track_id) {
                Some(existing) if existing.confidence >= detection.confidence => {}
                _ => {
                    self.best_matches.insert(detection.track_id, detection);
                }
            }
        }
    }

    pub fn evict(&mut self, track_id: u64) {
        self.best_matches.remove(&track_id);
    }

    /// Emit exactly one `UnifiedObject` per live track.
    pub fn fuse(&self, tracks: &[Track], analyses: &[TrackAnalysis], risks: &[RiskScore]) -> Vec<UnifiedObject> {
        let risk_by_id: HashMap<u64, &RiskScore> = risks.iter().map(|r| (r.track_id, r)).collect();
        let analysis_by_id: HashMap<u64, &TrackAnalysis> = analyses.iter().map(|a| (a.track_id, a)).collect();

        tracks
            .iter()
            .map(|track| {
                let analysis = analysis_by_id.get(&track.track_id);
                let risk_score = risk_by_id.get(&track.track_id).map(|r| r.score).unwrap_or(0.0);
                let semantic = self.best_matches.get(&track.track_id);

                UnifiedObject {
                    track_id: track.track_id,
                    class_id: track.class_id,
                    class_name: track.class_name.clone(),
                    confidence: track.confidence as f64,
                    bbox: track.bbox,
                    risk_score,
                    active_behaviors: analysis.map(|a| active_behavior_names(a)).unwrap_or_default(),
                    semantic_label: semantic.map(|d| d.label.clone()),
                    semantic_confidence: semantic.map(|d| d.confidence),
                    matched_phrase: semantic.and_then(|d| d.matched_phrase.clone()),
                    timestamp: Utc::now(),
                }
                .rounded()
            })
            .collect()
    }

    pub fn high_risk<'a>(&self, objects: &'a [UnifiedObject], threshold: f64) -> Vec<&'a UnifiedObject> {
        objects.iter().filter(|o| o.risk_score >= threshold).collect()
    }

    pub fn semantic_matches<'a>(&self, objects: &'a [UnifiedObject]) -> Vec<&'a UnifiedObject> {
        objects.iter().filter(|o| o.semantic_label.is_some()).collect()
    }
}

fn active_behavior_names(analysis: &TrackAnalysis) -> Vec<String> {
    let b = &analysis.behavior;
    let mut names = Vec::new();
    if b.is_stationary {
        names.push("stationary".to_string());
    }
    if b.is_loitering {
        names.push("loitering".to_string());
    }
    if b.is_running {
        names.push("running".to_string());
    }
    if b.sudden_speed_change {
        names.push("sudden_speed_change".to_string());
    }
    if b.direction_reversal {
        names.push("direction_reversal".to_string());
    }
    if b.is_erratic {
        names.push("erratic".to_string());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::{BehaviorFlags, BoundingBox, Explanation, MotionState, RiskLevel};

    fn track(id: u64) -> Track {
        Track {
            track_id: id,
            class_id: 0,
            class_name: "person".to_string(),
            confidence: 0.8,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    fn detection(track_id: u64, confidence: f64) -> SemanticDetection {
        SemanticDetection {
            track_id,
            frame_id: 0,
            label: "person with bag".into(),
            confidence,
            description: "desc".into(),
            matched_phrase: Some("person with bag".into()),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn one_unified_object_per_live_track() {
        let fusion = SemanticFusion::new();
        let tracks = vec![track(1), track(2)];
        let objects = fusion.fuse(&tracks, &[], &[]);
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn keeps_highest_confidence_semantic_match() {
        let mut fusion = SemanticFusion::new();
        fusion.ingest(vec![detection(1, 0.5)]);
        fusion.ingest(vec![detection(1, 0.9)]);
        fusion.ingest(vec![detection(1, 0.3)]);

        let objects = fusion.fuse(&[track(1)], &[], &[]);
        assert_eq!(objects[0].semantic_confidence, Some(0.9));
    }

    #[test]
    fn high_risk_filters_by_threshold() {
        let mut fusion = SemanticFusion::new();
        let _ = &mut fusion;
        let tracks = vec![track(1), track(2)];
        let risks = vec![
            RiskScore::new(1, 0.8, 0.8, RiskLevel::High, Explanation::new(vec![])),
            RiskScore::new(2, 0.1, 0.1, RiskLevel::Low, Explanation::new(vec![])),
        ];
        let objects = fusion.fuse(&tracks, &[], &risks);
        let high = fusion.high_risk(&objects, 0.5);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].track_id, 1);
    }

    #[test]
    fn active_behaviors_reflect_flags() {
        let analysis = TrackAnalysis {
            track_id: 1,
            class_id: 0,
            class_name: "person".to_string(),
            motion: MotionState::zero(),
            behavior: BehaviorFlags { is_loitering: true, ..BehaviorFlags::none() },
            history_length: 10,
            time_tracked: 1.0,
            current_position: (0.0, 0.0),
            current_bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        };
        let fusion = SemanticFusion::new();
        let objects = fusion.fuse(&[track(1)], &[analysis], &[]);
        assert!(objects[0].active_behaviors.contains(&"loitering".to_string()));
    }
}
