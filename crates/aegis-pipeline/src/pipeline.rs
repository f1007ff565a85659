//! Per-frame orchestration: history -> motion -> behavior -> crowd -> risk ->
//! alerts -> semantic trigger -> fusion, in that order every tick.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use aegis_alerts::AlertManager;
use aegis_analysis::Analyzer;
use aegis_models::{Alert, FrameRiskSummary, SemanticDetection, Track, UnifiedObject};
use aegis_risk::{RiskEngine, ZoneManager};
use aegis_semantic::{Crop, PromptManager, SemanticBackend, SemanticExecutor, SemanticFusion, SemanticTrigger};
use aegis_semantic::{FrameImage, UserQuery};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// Everything produced by one call to [`Pipeline::process_frame`].
pub struct FrameOutput {
    pub risk_summary: FrameRiskSummary,
    pub alerts: Vec<Alert>,
    pub objects: Vec<UnifiedObject>,
}

/// Owns every stage's state and runs them in the fixed order the scoring and
/// trigger logic assume: later stages read only what earlier stages in the
/// same tick produced.
pub struct Pipeline {
    config: PipelineConfig,
    analyzer: Analyzer,
    risk_engine: RiskEngine,
    zones: ZoneManager,
    alerts: AlertManager,
    trigger: SemanticTrigger,
    cache: PromptManager,
    executor: Option<Arc<SemanticExecutor>>,
    fusion: SemanticFusion,
    /// Tracks which `(prompt, image_hash)` a submitted-but-not-yet-resolved
    /// job corresponds to, so a completed result can be written back to the
    /// cache once it arrives.
    pending_cache_keys: HashMap<u64, (String, String)>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, zones: ZoneManager, backend: Option<Arc<dyn SemanticBackend>>) -> PipelineResult<Self> {
        let analyzer = Analyzer::new(config.analysis.clone())?;
        let risk_engine = RiskEngine::new(config.risk.clone())?;
        let alerts = AlertManager::new(config.alerts.clone())?;
        let cache = PromptManager::new(config.semantic.cache_ttl_seconds, config.semantic.max_cache_size);
        let executor = match backend {
            Some(backend) if config.semantic.enabled => Some(Arc::new(SemanticExecutor::new(config.semantic.clone(), backend)?)),
            _ => None,
        };

        Ok(Self {
            config,
            analyzer,
            risk_engine,
            zones,
            alerts,
            trigger: SemanticTrigger::new(),
            cache,
            executor,
            fusion: SemanticFusion::new(),
            pending_cache_keys: HashMap::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one frame through every stage. `frame` and `user_query` are both
    /// optional: without a frame no semantic trigger can fire at all.
    pub fn process_frame(
        &mut self,
        tracks: &[Track],
        frame_id: u64,
        t: f64,
        frame: Option<&FrameImage>,
        user_query: Option<&UserQuery>,
    ) -> FrameOutput {
        let (analyses, crowd, evicted) =
            self.analyzer.analyze_frame(tracks, frame_id, t, self.config.person_class_id, self.config.vehicle_class_id);

        for track_id in &evicted {
            self.risk_engine.evict(*track_id);
            self.trigger.evict(*track_id);
            self.fusion.evict(*track_id);
            self.pending_cache_keys.remove(track_id);
        }

        let risk_summary = self.risk_engine.compute_frame_risks(&analyses, &crowd, &self.zones, frame_id, t);

        let alerts: Vec<Alert> = risk_summary
            .track_risks
            .iter()
            .filter(|risk| risk.is_concerning)
            .filter_map(|risk| self.alerts.evaluate(risk, frame_id, None))
            .collect();

        self.drain_semantic_results();

        if let Some(events) = self.decide_triggers(&analyses, &risk_summary, user_query, frame, frame_id) {
            for event in events {
                self.dispatch_trigger(event);
            }
        }

        let objects = self.fusion.fuse(tracks, &analyses, &risk_summary.track_risks);

        FrameOutput { risk_summary, alerts, objects }
    }

    fn decide_triggers(
        &mut self,
        analyses: &[aegis_models::TrackAnalysis],
        risk_summary: &FrameRiskSummary,
        user_query: Option<&UserQuery>,
        frame: Option<&FrameImage>,
        frame_id: u64,
    ) -> Option<Vec<aegis_models::TriggerEvent>> {
        if frame.is_none() {
            return None;
        }
        let events = self.trigger.decide(&self.config.semantic, analyses, &risk_summary.track_risks, user_query, frame, frame_id, Instant::now());
        if events.is_empty() {
            None
        } else {
            Some(events)
        }
    }

    /// Drain any semantic results that have completed since the last tick,
    /// writing each back to the prompt cache before fusing it in.
    fn drain_semantic_results(&mut self) {
        let Some(executor) = self.executor.as_ref() else {
            return;
        };
        let detections = executor.get_results();
        if detections.is_empty() {
            return;
        }
        for detection in &detections {
            if let Some((prompt, hash)) = self.pending_cache_keys.remove(&detection.track_id) {
                self.cache.put(&prompt, &hash, vec![detection.clone()]);
            }
        }
        self.fusion.ingest(detections);
    }

    /// Serve a trigger from cache when possible; otherwise submit it to the
    /// executor and remember the cache key for when it resolves.
    fn dispatch_trigger(&mut self, event: aegis_models::TriggerEvent) {
        if let Some(cached) = self.cache.get(&event.prompt, &event.image_hash) {
            debug!(track_id = event.track_id, "semantic cache hit");
            let remapped: Vec<SemanticDetection> = cached
                .into_iter()
                .map(|d| SemanticDetection { track_id: event.track_id, frame_id: event.frame_id, ..d })
                .collect();
            self.fusion.ingest(remapped);
            return;
        }

        let Some(executor) = self.executor.as_ref() else {
            return;
        };
        let crop = Crop::new(event.crop_width, event.crop_height, event.cropped_frame);
        if executor.submit(event.track_id, event.frame_id, crop, event.prompt.clone()) {
            self.pending_cache_keys.insert(event.track_id, (event.prompt, event.image_hash));
        }
    }

    /// Cooperative shutdown: stop accepting new semantic work and wait up to
    /// `shutdown_grace` for in-flight jobs to finish.
    pub async fn shutdown(&self) {
        if let Some(executor) = &self.executor {
            executor.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::BoundingBox;

    fn track(id: u64, x: f64, y: f64) -> Track {
        Track {
            track_id: id,
            class_id: 0,
            class_name: "person".to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(x - 5.0, y - 5.0, x + 5.0, y + 5.0),
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default(), ZoneManager::empty(), None).unwrap()
    }

    #[test]
    fn process_frame_without_semantic_backend_still_scores_and_fuses() {
        let mut pipeline = pipeline();
        let tracks = vec![track(1, 10.0, 10.0)];
        let output = pipeline.process_frame(&tracks, 0, 0.0, None, None);
        assert_eq!(output.objects.len(), 1);
        assert_eq!(output.risk_summary.track_risks.len(), 1);
    }

    #[test]
    fn eviction_clears_pending_cache_key() {
        let mut pipeline = pipeline();
        pipeline.pending_cache_keys.insert(1, ("p".into(), "h".into()));
        let tracks = vec![track(1, 10.0, 10.0)];
        pipeline.process_frame(&tracks, 0, 0.0, None, None);
        pipeline.process_frame(&[], 200, 20.0, None, None);
        assert!(!pipeline.pending_cache_keys.contains_key(&1));
    }

    #[test]
    fn stationary_identity_raises_score_over_time() {
        let mut pipeline = pipeline();
        let mut frame_id = 0u64;
        let mut t = 0.0;
        let mut first_score = None;
        let mut last_score = 0.0;
        for _ in 0..40 {
            let output = pipeline.process_frame(&[track(1, 10.0, 10.0)], frame_id, t, None, None);
            let score = output.risk_summary.track_risks[0].score;
            first_score.get_or_insert(score);
            last_score = score;
            frame_id += 1;
            t += 0.2;
        }
        assert!(last_score >= first_score.unwrap());
    }
}
