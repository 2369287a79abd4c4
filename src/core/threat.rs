//! Threat classification from entity type and behavior flags (spec.md §4.6).

use serde::{Deserialize, Serialize};

use crate::core::correlation::CorrelatedEntity;

const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn priority_score(self) -> u32 {
        match self {
            ThreatLevel::Critical => 100,
            ThreatLevel::High => 75,
            ThreatLevel::Medium => 50,
            ThreatLevel::Low => 25,
        }
    }
}

fn is_high_threat_type(entity_type: &str) -> bool {
    entity_type.eq_ignore_ascii_case("airplane")
}

fn is_medium_threat_type(entity_type: &str) -> bool {
    entity_type.eq_ignore_ascii_case("truck") || entity_type.eq_ignore_ascii_case("boat")
}

/// Classifies correlated entities by threat level per the decision table in
/// spec.md §4.6 (entity type × loiter/formation flags × confidence).
pub struct ThreatClassifier {
    confidence_threshold: f64,
}

impl Default for ThreatClassifier {
    fn default() -> Self {
        ThreatClassifier {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ThreatClassifier {
    pub fn new(confidence_threshold: f64) -> Self {
        ThreatClassifier {
            confidence_threshold,
        }
    }

    pub fn classify(
        &self,
        entity: &CorrelatedEntity,
        is_loitering: bool,
        in_formation: bool,
    ) -> ThreatLevel {
        let entity_type = entity.entity_type.as_str();

        if is_high_threat_type(entity_type) {
            if is_loitering {
                return ThreatLevel::Critical;
            }
            return if entity.confidence >= self.confidence_threshold {
                ThreatLevel::High
            } else {
                ThreatLevel::Medium
            };
        }

        if is_medium_threat_type(entity_type) {
            if is_loitering || in_formation {
                return ThreatLevel::High;
            }
            return if entity.confidence >= self.confidence_threshold {
                ThreatLevel::Medium
            } else {
                ThreatLevel::Low
            };
        }

        if is_loitering || in_formation {
            return ThreatLevel::Medium;
        }
        ThreatLevel::Low
    }

    pub fn should_auto_task(&self, level: ThreatLevel) -> bool {
        matches!(level, ThreatLevel::High | ThreatLevel::Critical)
    }
}
