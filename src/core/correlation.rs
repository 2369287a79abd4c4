//! Cross-sensor entity correlation with lifecycle (C4).
//!
//! The single most load-bearing subsystem in the pipeline: every detection
//! is folded into a [`CorrelatedEntity`] here before analytics, threat
//! classification or tasking ever see it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::{distance_deg, meters_to_degrees};

pub const CORRELATION_RADIUS_M: f64 = 100.0;
pub const CORRELATION_TIME_WINDOW: Duration = Duration::from_secs(60);
pub const FIRM_OBSERVATION_THRESHOLD: u32 = 2;

fn tentative_ttl() -> Duration {
    Duration::from_secs(30)
}
fn firm_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}
fn stale_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Tentative,
    Firm,
    Stale,
    Dropped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Tentative => "TENTATIVE",
            LifecycleState::Firm => "FIRM",
            LifecycleState::Stale => "STALE",
            LifecycleState::Dropped => "DROPPED",
        }
    }
}

/// A mutable, correlation-owned entity record. Consumers outside C4 only
/// ever see snapshots cloned out of the matcher.
#[derive(Debug, Clone)]
pub struct CorrelatedEntity {
    pub entity_id: String,
    pub entity_type: String,
    pub location: (f64, f64),
    pub confidence: f64,
    pub state: LifecycleState,
    pub observation_count: u32,
    pub(crate) first_seen: Instant,
    pub(crate) last_seen: Instant,
    pub sources: Vec<String>,
}

impl CorrelatedEntity {
    fn new(entity_type: &str, location: (f64, f64), confidence: f64, source: &str) -> Self {
        let now = Instant::now();
        Self {
            entity_id: Uuid::new_v4().to_string(),
            entity_type: entity_type.to_string(),
            location,
            confidence,
            state: LifecycleState::Tentative,
            observation_count: 1,
            first_seen: now,
            last_seen: now,
            sources: vec![source.to_string()],
        }
    }

    /// Fold a new observation into this entity: replace location, take the
    /// running maximum confidence, append the source if new, and promote
    /// `TENTATIVE -> FIRM` once the observation threshold is met.
    pub fn update(&mut self, location: (f64, f64), confidence: f64, source: &str) {
        self.location = location;
        self.confidence = self.confidence.max(confidence);
        self.observation_count += 1;
        self.last_seen = Instant::now();
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
        if self.observation_count >= FIRM_OBSERVATION_THRESHOLD
            && matches!(self.state, LifecycleState::Tentative)
        {
            self.state = LifecycleState::Firm;
        }
    }

    /// Advance lifecycle state based on age since `last_seen`. No-op once
    /// `DROPPED` — terminal state.
    pub fn check_staleness(&mut self) {
        if matches!(self.state, LifecycleState::Dropped) {
            return;
        }
        let age = self.last_seen.elapsed();
        let ttl = match self.state {
            LifecycleState::Tentative => tentative_ttl(),
            LifecycleState::Firm => firm_ttl(),
            LifecycleState::Stale => stale_ttl(),
            LifecycleState::Dropped => return,
        };
        if age > ttl {
            self.state = match self.state {
                LifecycleState::Tentative => LifecycleState::Dropped,
                LifecycleState::Firm => LifecycleState::Stale,
                LifecycleState::Stale => LifecycleState::Dropped,
                LifecycleState::Dropped => LifecycleState::Dropped,
            };
        }
    }
}

/// Correlates detections across sensors to maintain unified entity tracks.
/// Owns entity records exclusively — spec.md §3 Ownership.
#[derive(Default)]
pub struct EntityMatcher {
    entities: Mutex<HashMap<String, CorrelatedEntity>>,
    radius_deg: f64,
}

impl EntityMatcher {
    pub fn new() -> Self {
        Self {
            entities: Mutex::new(HashMap::new()),
            radius_deg: meters_to_degrees(CORRELATION_RADIUS_M),
        }
    }

    /// Correlate an observation with existing entities, creating one if no
    /// match is found. See spec.md §4.4 for the full algorithm.
    pub fn correlate(
        &self,
        entity_type: &str,
        location: (f64, f64),
        confidence: f64,
        source: &str,
    ) -> CorrelatedEntity {
        let mut entities = self.entities.lock().unwrap();
        entities.retain(|_, e| !matches!(e.state, LifecycleState::Dropped));

        let mut best_id: Option<String> = None;
        let mut best_distance = f64::INFINITY;

        for (id, entity) in entities.iter() {
            if matches!(entity.state, LifecycleState::Dropped) {
                continue;
            }
            if entity.entity_type != entity_type {
                continue;
            }
            if entity.last_seen.elapsed() > CORRELATION_TIME_WINDOW {
                continue;
            }
            let distance = distance_deg(entity.location, location);
            if distance <= self.radius_deg && distance < best_distance {
                best_id = Some(id.clone());
                best_distance = distance;
            }
        }

        if let Some(id) = best_id {
            let entity = entities.get_mut(&id).unwrap();
            entity.update(location, confidence, source);
            return entity.clone();
        }

        let entity = CorrelatedEntity::new(entity_type, location, confidence, source);
        entities.insert(entity.entity_id.clone(), entity.clone());
        entity
    }

    pub fn get_entity(&self, entity_id: &str) -> Option<CorrelatedEntity> {
        self.entities.lock().unwrap().get(entity_id).cloned()
    }

    /// Active (non-dropped) entities, after sweeping staleness transitions.
    pub fn get_active_entities(&self) -> Vec<CorrelatedEntity> {
        let mut entities = self.entities.lock().unwrap();
        for e in entities.values_mut() {
            e.check_staleness();
        }
        entities
            .values()
            .filter(|e| !matches!(e.state, LifecycleState::Dropped))
            .cloned()
            .collect()
    }

    pub fn get_firm_entities(&self) -> Vec<CorrelatedEntity> {
        self.get_active_entities()
            .into_iter()
            .filter(|e| matches!(e.state, LifecycleState::Firm))
            .collect()
    }

    /// Count active (post-sweep) entities by lifecycle state.
    pub fn entity_count(&self) -> HashMap<&'static str, usize> {
        let mut entities = self.entities.lock().unwrap();
        for e in entities.values_mut() {
            e.check_staleness();
        }
        let mut counts = HashMap::from([
            ("TENTATIVE", 0),
            ("FIRM", 0),
            ("STALE", 0),
            ("DROPPED", 0),
        ]);
        for e in entities.values() {
            *counts.get_mut(e.state.as_str()).unwrap() += 1;
        }
        counts
    }
}
