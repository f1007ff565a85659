//! History, motion, behavior, and crowd analysis for the Aegis pipeline.
//!
//! This crate owns the first half of the per-frame pipeline: turning raw
//! `Track` records into `TrackAnalysis` snapshots and frame-level
//! `CrowdMetrics`, strictly in the order history -> motion -> behavior -> crowd.

pub mod behavior;
pub mod config;
pub mod crowd;
pub mod error;
pub mod history;
pub mod motion;

pub use behavior::BehaviorAnalyzer;
pub use config::AnalysisConfig;
pub use crowd::CrowdAnalyzer;
pub use error::{AnalysisError, AnalysisResult};
pub use history::HistoryManager;
pub use motion::MotionAnalyzer;

use aegis_models::{CrowdMetrics, Track, TrackAnalysis};

/// Orchestrates the history -> motion -> behavior -> crowd stages for one frame.
pub struct Analyzer {
    config: AnalysisConfig,
    history: HistoryManager,
    behavior: BehaviorAnalyzer,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        let history = HistoryManager::new(&config);
        Ok(Self { history, behavior: BehaviorAnalyzer::new(), config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Run the full analysis stage for one frame, returning the per-identity
    /// snapshots, the frame's crowd metrics, and any identities evicted as
    /// stale this call (callers must propagate eviction to downstream
    /// per-identity state: risk EMA, trigger cooldowns, fusion matches).
    pub fn analyze_frame(
        &mut self,
        tracks: &[Track],
        frame_id: u64,
        t: f64,
        person_class_id: u32,
        vehicle_class_id: u32,
    ) -> (Vec<TrackAnalysis>, CrowdMetrics, Vec<u64>) {
        let evicted = self.history.update(tracks, frame_id, t);
        for track_id in &evicted {
            self.behavior.evict(*track_id);
        }

        let motion_analyzer = MotionAnalyzer::new(&self.config);
        let mut analyses = Vec::with_capacity(tracks.len());
        for track in tracks {
            let Some(history) = self.history.get_history(track.track_id) else {
                continue;
            };
            let motion = motion_analyzer.analyze(history);
            let behavior = self.behavior.analyze(&self.config, track.track_id, history, &motion, t);
            let current_position = track.bbox.center();

            analyses.push(TrackAnalysis {
                track_id: track.track_id,
                class_id: track.class_id,
                class_name: track.class_name.clone(),
                motion,
                behavior,
                history_length: history.len(),
                time_tracked: history.duration(),
                current_position,
                current_bbox: track.bbox,
            });
        }

        let crowd_analyzer = CrowdAnalyzer::new(&self.config);
        let crowd = crowd_analyzer.analyze(tracks, person_class_id, vehicle_class_id);

        (analyses, crowd, evicted)
    }
}
