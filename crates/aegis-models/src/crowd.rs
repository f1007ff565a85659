//! Grid-cell crowd density metrics for a single frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdMetrics {
    pub person_count: u32,
    pub vehicle_count: u32,
    pub grid_densities: HashMap<(i64, i64), u32>,
    pub max_density: u32,
    pub crowd_detected: bool,
}

impl CrowdMetrics {
    pub fn empty() -> Self {
        Self {
            person_count: 0,
            vehicle_count: 0,
            grid_densities: HashMap::new(),
            max_density: 0,
            crowd_detected: false,
        }
    }

    /// Density of the grid cell containing `(x, y)`, given the same
    /// `grid_cell_size` used to build `grid_densities`.
    pub fn density_at(&self, x: f64, y: f64, grid_cell_size: f64) -> u32 {
        let cell = (
            (x / grid_cell_size).floor() as i64,
            (y / grid_cell_size).floor() as i64,
        );
        self.grid_densities.get(&cell).copied().unwrap_or(0)
    }
}

impl Default for CrowdMetrics {
    fn default() -> Self {
        Self::empty()
    }
}
