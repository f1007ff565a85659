//! Bounded per-identity position history.

use std::collections::HashMap;

use aegis_models::{PositionRecord, Track, TrackHistory};

use crate::config::AnalysisConfig;

/// Owns one [`TrackHistory`] per live identity and evicts stale ones.
#[derive(Debug)]
pub struct HistoryManager {
    histories: HashMap<u64, TrackHistory>,
    capacity: usize,
    stale_threshold: u64,
}

impl HistoryManager {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            histories: HashMap::new(),
            capacity: config.history_window_size,
            stale_threshold: config.stale_threshold,
        }
    }

    /// Append a position sample for every live track, then drop histories
    /// not seen within `stale_threshold` frames of `frame_id`.
    ///
    /// Returns the set of track IDs evicted this call.
    pub fn update(&mut self, tracks: &[Track], frame_id: u64, t: f64) -> Vec<u64> {
        for track in tracks {
            let (x, y) = track.bbox.center();
            let record = PositionRecord { x, y, frame_id, t };
            self.histories
                .entry(track.track_id)
                .and_modify(|h| h.push(record))
                .or_insert_with(|| TrackHistory::new(self.capacity, record));
        }
        self.evict_stale(frame_id)
    }

    fn evict_stale(&mut self, current_frame_id: u64) -> Vec<u64> {
        let stale_threshold = self.stale_threshold;
        let mut evicted = Vec::new();
        self.histories.retain(|track_id, history| {
            let age = current_frame_id.saturating_sub(history.last_seen_frame());
            if age > stale_threshold {
                evicted.push(*track_id);
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn get_history(&self, track_id: u64) -> Option<&TrackHistory> {
        self.histories.get(&track_id)
    }

    pub fn duration(&self, track_id: u64) -> f64 {
        self.histories.get(&track_id).map(TrackHistory::duration).unwrap_or(0.0)
    }

    pub fn history_length(&self, track_id: u64) -> usize {
        self.histories.get(&track_id).map(TrackHistory::len).unwrap_or(0)
    }

    pub fn live_track_ids(&self) -> impl Iterator<Item = &u64> {
        self.histories.keys()
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
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

    #[test]
    fn stale_identities_are_evicted() {
        let config = AnalysisConfig { stale_threshold: 3, ..AnalysisConfig::default() };
        let mut manager = HistoryManager::new(&config);
        manager.update(&[track(1, 10.0, 10.0)], 0, 0.0);
        assert_eq!(manager.len(), 1);

        manager.update(&[], 10, 1.0);
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn history_length_tracks_window_capacity() {
        let config = AnalysisConfig { history_window_size: 2, ..AnalysisConfig::default() };
        let mut manager = HistoryManager::new(&config);
        for frame in 0..5u64 {
            manager.update(&[track(1, frame as f64, 0.0)], frame, frame as f64 / 30.0);
        }
        assert_eq!(manager.history_length(1), 2);
    }
}
