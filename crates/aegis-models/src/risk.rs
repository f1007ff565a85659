//! Risk scoring output types: per-track scores, explanations, and frame summaries.

use serde::{Deserialize, Serialize};

/// Coarse risk bucket derived from a continuous score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify a raw score in `[0, 1]` against a set of ascending thresholds.
    /// Ties resolve to the higher level (`>=`).
    pub fn from_score(score: f64, medium: f64, high: f64, critical: f64) -> Self {
        if score >= critical {
            RiskLevel::Critical
        } else if score >= high {
            RiskLevel::High
        } else if score >= medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn is_concerning(&self) -> bool {
        *self >= RiskLevel::Medium
    }
}

/// One named contributor to a risk score, in `[0, 1]` before weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub raw_value: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Ordered, deterministic breakdown of how a score was reached.
///
/// `factors` is always sorted by `name` so two runs over identical input
/// produce byte-identical serialized explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub factors: Vec<Factor>,
    pub summary: String,
}

impl Explanation {
    pub fn new(mut factors: Vec<Factor>) -> Self {
        factors.sort_by(|a, b| a.name.cmp(&b.name));
        let summary = Self::build_summary(&factors);
        Self { factors, summary }
    }

    /// Concatenates the descriptions of the top 2 factors by contribution,
    /// e.g. "Sustained loitering near restricted zone; sudden speed change
    /// detected." Falls back to "Normal behavior." when nothing contributes.
    fn build_summary(factors: &[Factor]) -> String {
        if Self::top_contributing(factors, 2).is_empty() {
            return "Normal behavior.".to_string();
        }
        Self::top_contributing(factors, 2)
            .into_iter()
            .map(|f| f.description.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Factors with positive contribution, ranked descending by contribution
    /// (ties broken by name), capped at `n`.
    fn top_contributing(factors: &[Factor], n: usize) -> Vec<&Factor> {
        let mut contributing: Vec<&Factor> = factors.iter().filter(|f| f.contribution > 0.0).collect();
        contributing.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        contributing.into_iter().take(n).collect()
    }

    /// Names of the top `n` contributing factors, for compact alert payloads.
    pub fn top_factor_names(&self, n: usize) -> Vec<String> {
        Self::top_contributing(&self.factors, n).into_iter().map(|f| f.name.clone()).collect()
    }
}

/// Risk score for one identity in one frame, after temporal smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub track_id: u64,
    /// Smoothed score in `[0, 1]` actually used for level classification.
    pub score: f64,
    /// Unsmoothed instantaneous score for this frame alone.
    pub raw_score: f64,
    pub level: RiskLevel,
    pub explanation: Explanation,
    pub is_concerning: bool,
}

impl RiskScore {
    pub fn new(track_id: u64, score: f64, raw_score: f64, level: RiskLevel, explanation: Explanation) -> Self {
        Self {
            track_id,
            score,
            raw_score,
            is_concerning: level.is_concerning(),
            level,
            explanation,
        }
    }
}

/// Aggregated risk posture for an entire frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRiskSummary {
    pub frame_id: u64,
    pub t: f64,
    pub track_risks: Vec<RiskScore>,
    pub max_risk_level: RiskLevel,
    pub max_risk_score: f64,
    pub concerning_tracks: usize,
    pub concerning_track_ids: Vec<u64>,
    pub has_concerns: bool,
}

impl FrameRiskSummary {
    /// Build a summary from per-track scores, deriving the aggregate fields.
    pub fn from_scores(frame_id: u64, t: f64, track_risks: Vec<RiskScore>) -> Self {
        let max_risk_score = track_risks.iter().map(|r| r.score).fold(0.0_f64, f64::max);
        let max_risk_level = track_risks
            .iter()
            .map(|r| r.level)
            .max()
            .unwrap_or(RiskLevel::Low);
        let concerning_track_ids: Vec<u64> = track_risks
            .iter()
            .filter(|r| r.is_concerning)
            .map(|r| r.track_id)
            .collect();
        let concerning_tracks = concerning_track_ids.len();
        let has_concerns = concerning_tracks > 0;
        Self {
            frame_id,
            t,
            track_risks,
            max_risk_level,
            max_risk_score,
            concerning_tracks,
            concerning_track_ids,
            has_concerns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(name: &str, contribution: f64) -> Factor {
        Factor {
            name: name.to_string(),
            display_name: name.to_string(),
            description: format!("{name} factor"),
            raw_value: contribution,
            weight: 1.0,
            contribution,
        }
    }

    #[test]
    fn level_thresholds_are_inclusive_lower_bound() {
        assert_eq!(RiskLevel::from_score(0.25, 0.25, 0.50, 0.75), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.249, 0.25, 0.50, 0.75), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.75, 0.25, 0.50, 0.75), RiskLevel::Critical);
    }

    #[test]
    fn explanation_sorts_factors_by_name() {
        let explanation = Explanation::new(vec![factor("speed", 0.09), factor("crowd", 0.024)]);
        assert_eq!(explanation.factors[0].name, "crowd");
        assert_eq!(explanation.factors[1].name, "speed");
    }

    #[test]
    fn explanation_summary_falls_back_when_nothing_contributes() {
        let explanation = Explanation::new(vec![]);
        assert_eq!(explanation.summary, "Normal behavior.");
    }

    #[test]
    fn frame_summary_aggregates_max_and_concerning() {
        let risks = vec![
            RiskScore::new(1, 0.9, 0.9, RiskLevel::Critical, Explanation::new(vec![])),
            RiskScore::new(2, 0.1, 0.1, RiskLevel::Low, Explanation::new(vec![])),
        ];
        let summary = FrameRiskSummary::from_scores(7, 1.0, risks);
        assert_eq!(summary.max_risk_score, 0.9);
        assert_eq!(summary.max_risk_level, RiskLevel::Critical);
        assert_eq!(summary.concerning_track_ids, vec![1]);
        assert_eq!(summary.concerning_tracks, 1);
        assert!(summary.has_concerns);
    }
}
