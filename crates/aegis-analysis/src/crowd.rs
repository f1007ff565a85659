//! Grid-cell crowd density over the live track set.

use std::collections::HashMap;

use aegis_models::{CrowdMetrics, Track};

use crate::config::AnalysisConfig;

pub struct CrowdAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> CrowdAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Bucket every live track's bbox center into a `grid_cell_size` grid.
    ///
    /// `person_class_id`/`vehicle_class_id` select which class IDs count
    /// toward `person_count`/`vehicle_count` respectively.
    pub fn analyze(&self, tracks: &[Track], person_class_id: u32, vehicle_class_id: u32) -> CrowdMetrics {
        let mut grid_densities: HashMap<(i64, i64), u32> = HashMap::new();
        let mut person_count = 0;
        let mut vehicle_count = 0;

        for track in tracks {
            let (x, y) = track.bbox.center();
            let cell = (
                (x / self.config.grid_cell_size).floor() as i64,
                (y / self.config.grid_cell_size).floor() as i64,
            );
            *grid_densities.entry(cell).or_insert(0) += 1;

            if track.class_id == person_class_id {
                person_count += 1;
            } else if track.class_id == vehicle_class_id {
                vehicle_count += 1;
            }
        }

        let max_density = grid_densities.values().copied().max().unwrap_or(0);
        let crowd_detected = max_density >= self.config.crowd_density_threshold;

        CrowdMetrics {
            person_count,
            vehicle_count,
            grid_densities,
            max_density,
            crowd_detected,
        }
    }
}
