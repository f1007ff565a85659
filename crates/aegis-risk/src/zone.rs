//! Optional named-zone risk weighting, consulted by the `zone_context` factor.

/// A polygonal region with an associated risk multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    /// Closed polygon in frame pixel coordinates.
    pub polygon: Vec<(f64, f64)>,
    pub risk_weight: f64,
}

/// Looks up which configured zone (if any) contains a point.
///
/// Construction-time only; zones never change during a run. When empty,
/// every lookup returns `0.0`, matching "0 when zones disabled".
#[derive(Debug, Clone, Default)]
pub struct ZoneManager {
    zones: Vec<Zone>,
}

impl ZoneManager {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn empty() -> Self {
        Self { zones: Vec::new() }
    }

    /// Risk weight of the first zone (in insertion order) containing `point`.
    pub fn risk_weight_at(&self, point: (f64, f64)) -> f64 {
        self.zones
            .iter()
            .find(|zone| point_in_polygon(point, &zone.polygon))
            .map(|zone| zone.risk_weight)
            .unwrap_or(0.0)
    }
}

/// Standard ray-casting point-in-polygon test.
fn point_in_polygon(point: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let (x, y) = point;
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manager_has_no_weight() {
        let manager = ZoneManager::empty();
        assert_eq!(manager.risk_weight_at((10.0, 10.0)), 0.0);
    }

    #[test]
    fn point_inside_square_zone_gets_its_weight() {
        let zone = Zone {
            name: "restricted".into(),
            polygon: vec![(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)],
            risk_weight: 0.8,
        };
        let manager = ZoneManager::new(vec![zone]);
        assert_eq!(manager.risk_weight_at((50.0, 50.0)), 0.8);
        assert_eq!(manager.risk_weight_at((500.0, 500.0)), 0.0);
    }
}
