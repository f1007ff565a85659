//! Level mapping, per-identity cooldown, and emission of operator alerts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::warn;

use aegis_models::{Alert, AlertLevel, RiskScore};

use crate::config::{level_priority, AlertManagerConfig};
use crate::error::AlertResult;
use crate::sink::FileSink;

static EVENT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_event_id() -> String {
    let n = EVENT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("evt_{n}")
}

/// Maps risk levels to operator-facing alert levels, deduplicates via a
/// per-identity cooldown, and optionally appends to a JSON-lines file.
pub struct AlertManager {
    config: AlertManagerConfig,
    last_emitted: HashMap<u64, Instant>,
    level_counts: HashMap<AlertLevel, u64>,
    sink: Option<FileSink>,
}

impl AlertManager {
    pub fn new(config: AlertManagerConfig) -> AlertResult<Self> {
        config.validate()?;
        let sink = if config.log_to_file {
            let path = config.log_path.as_ref().expect("validated: log_to_file requires log_path");
            match FileSink::open(path) {
                Ok(sink) => Some(sink),
                Err(err) => {
                    warn!(error = %err, "alert file sink unwritable at startup; continuing without it");
                    None
                }
            }
        } else {
            None
        };
        Ok(Self {
            config,
            last_emitted: HashMap::new(),
            level_counts: HashMap::new(),
            sink,
        })
    }

    /// Evaluate one track's risk score and, if it clears the level floor and
    /// cooldown, emit and record an `Alert`. Returns `None` (never errors)
    /// when suppressed — disabled managers always return `None`.
    pub fn evaluate(&mut self, risk: &RiskScore, frame_id: u64, zone: Option<&str>) -> Option<Alert> {
        if !self.config.enabled {
            return None;
        }

        let level: AlertLevel = risk.level.into();
        if level_priority(level) < level_priority(self.config.min_level) {
            return None;
        }

        let now = Instant::now();
        if let Some(last) = self.last_emitted.get(&risk.track_id) {
            let elapsed = now.duration_since(*last);
            if elapsed < Duration::from_secs_f64(self.config.cooldown_seconds) {
                return None;
            }
        }

        let alert = Alert {
            event_id: next_event_id(),
            track_id: risk.track_id,
            frame_id,
            level,
            score: risk.score,
            reason: format!(
                "{}{}",
                risk.explanation.summary,
                zone.map(|z| format!(" (zone: {z})")).unwrap_or_default()
            ),
            zone: zone.map(|z| z.to_string()),
            factors: risk.explanation.top_factor_names(2),
            timestamp: Utc::now(),
        };

        self.last_emitted.insert(risk.track_id, now);
        *self.level_counts.entry(level).or_insert(0) += 1;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.write(&alert).and_then(|_| sink.flush()) {
                warn!(error = %err, event_id = %alert.event_id, "failed to write alert to file sink");
            }
        }

        Some(alert)
    }

    /// Count of alerts emitted so far, keyed by level.
    pub fn summary_by_level(&self) -> &HashMap<AlertLevel, u64> {
        &self.level_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_models::{Explanation, RiskLevel};

    fn risk(track_id: u64, score: f64, level: RiskLevel) -> RiskScore {
        RiskScore::new(track_id, score, score, level, Explanation::new(vec![]))
    }

    #[test]
    fn disabled_manager_emits_nothing() {
        let config = AlertManagerConfig { enabled: false, ..AlertManagerConfig::default() };
        let mut manager = AlertManager::new(config).unwrap();
        let alert = manager.evaluate(&risk(1, 0.9, RiskLevel::Critical), 1, None);
        assert!(alert.is_none());
    }

    #[test]
    fn below_min_level_is_suppressed() {
        let mut manager = AlertManager::new(AlertManagerConfig::default()).unwrap();
        let alert = manager.evaluate(&risk(1, 0.1, RiskLevel::Low), 1, None);
        assert!(alert.is_none());
    }

    #[test]
    fn cooldown_suppresses_second_alert_same_identity() {
        let config = AlertManagerConfig { cooldown_seconds: 10.0, ..AlertManagerConfig::default() };
        let mut manager = AlertManager::new(config).unwrap();
        let first = manager.evaluate(&risk(1, 0.9, RiskLevel::Critical), 1, None);
        let second = manager.evaluate(&risk(1, 0.9, RiskLevel::Critical), 2, None);
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn distinct_identities_are_independent() {
        let mut manager = AlertManager::new(AlertManagerConfig::default()).unwrap();
        let a = manager.evaluate(&risk(1, 0.9, RiskLevel::Critical), 1, None);
        let b = manager.evaluate(&risk(2, 0.9, RiskLevel::Critical), 1, None);
        assert!(a.is_some());
        assert!(b.is_some());
    }

    #[test]
    fn summary_counts_emitted_alerts_by_level() {
        let mut manager = AlertManager::new(AlertManagerConfig::default()).unwrap();
        manager.evaluate(&risk(1, 0.9, RiskLevel::Critical), 1, None);
        manager.evaluate(&risk(2, 0.6, RiskLevel::High), 1, None);
        let summary = manager.summary_by_level();
        assert_eq!(summary.get(&AlertLevel::Critical), Some(&1));
        assert_eq!(summary.get(&AlertLevel::High), Some(&1));
    }
}
