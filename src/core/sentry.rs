//! Sentry decision engine (C8, spec.md §4.8).
//!
//! Drives fusion → correlation → analytics → asset assignment for a batch
//! of detections, emitting `Track`/`Task` records through the sink.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::analytics::detect_loitering;
use crate::core::assets::AssetRegistry;
use crate::core::correlation::EntityMatcher;
use crate::core::detection::Detection;
use crate::core::track_state::TrackStateCache;
use crate::models::task::{Priority, Task, TaskData, TaskType};
use crate::models::track::Track;

const HIGH_PRIORITY_LABELS: [&str; 3] = ["airplane", "truck", "boat"];
const CONFIDENCE_THRESHOLD: f64 = 0.85;
const DEBOUNCE_WINDOW: Duration = Duration::from_secs(10 * 60);

fn is_high_priority_label(label: &str) -> bool {
    HIGH_PRIORITY_LABELS.contains(&label)
}

/// Aggregate counters returned from a single [`Sentry::process_detections`]
/// call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    pub tracks: u32,
    pub tasks: u32,
}

/// Result of processing one detection: the track always produced, plus an
/// optional cueing task.
pub struct Processed {
    pub track: Track,
    pub task: Option<Task>,
}

/// Per-entity debounce map (spec.md §4.8). Per-process state; tests reset it
/// by constructing a fresh [`Sentry`].
#[derive(Default)]
struct Debouncer {
    recent_tasks: Mutex<HashMap<String, Instant>>,
}

impl Debouncer {
    fn should_task(&self, entity_id: &str) -> bool {
        let mut recent = self.recent_tasks.lock().unwrap();
        let now = Instant::now();
        if let Some(last) = recent.get(entity_id) {
            if now.duration_since(*last) < DEBOUNCE_WINDOW {
                return false;
            }
        }
        recent.insert(entity_id.to_string(), now);
        true
    }
}

/// Drives C3→C4→C5→C6→C7 and publishes the resulting tracks/tasks. Holds no
/// sink or bus reference itself — callers publish what it returns.
pub struct Sentry {
    matcher: EntityMatcher,
    track_state: TrackStateCache,
    debouncer: Debouncer,
}

impl Sentry {
    pub fn new() -> Self {
        Sentry {
            matcher: EntityMatcher::new(),
            track_state: TrackStateCache::new(),
            debouncer: Debouncer::default(),
        }
    }

    pub fn track_state(&self) -> &TrackStateCache {
        &self.track_state
    }

    pub fn matcher(&self) -> &EntityMatcher {
        &self.matcher
    }

    /// Process a batch of (already fused) detections, returning a `Track`
    /// for every detection plus a `Task` wherever cueing is warranted.
    pub fn process_detections(
        &self,
        detections: &[Detection],
        assets: &AssetRegistry,
    ) -> (Vec<Processed>, ProcessStats) {
        let mut processed = Vec::with_capacity(detections.len());
        let mut stats = ProcessStats::default();

        for detection in detections {
            let location = detection.geo_location.unwrap_or((0.0, 0.0));
            let source = detection
                .source
                .map(|s| s.as_str())
                .unwrap_or("unknown");
            let correlated =
                self.matcher
                    .correlate(&detection.label, location, detection.confidence, source);

            let mut track = Track::from_correlated(correlated.entity_id.clone(), detection);
            track.lifecycle_state = Some(correlated.state.as_str().to_string());
            stats.tracks += 1;

            if detection.geo_location.is_some() {
                self.track_state.update_position(&track.entity_id, location);
            }

            let is_loitering = detect_loitering(&self.track_state, &track.entity_id);
            let is_high_priority =
                is_high_priority_label(&detection.label) && detection.confidence >= CONFIDENCE_THRESHOLD;

            let task = if (is_high_priority || is_loitering)
                && self.debouncer.should_task(&track.entity_id)
            {
                let assigned = assets.assign_asset(location, &assets.get_available_assets());
                let task_type = if is_loitering {
                    TaskType::AnomalyVerification
                } else {
                    TaskType::VerificationRequest
                };
                let priority = if detection.label == "airplane" || is_loitering {
                    Priority::High
                } else {
                    Priority::Medium
                };
                let description = format!("Confirm {} at {:?}", detection.label, location);
                let assigned_to = assigned
                    .map(|a| a.id)
                    .unwrap_or_else(|| "DISPATCH_PENDING".to_string());

                stats.tasks += 1;
                Some(Task::new(
                    Uuid::new_v4().to_string(),
                    track.entity_id.clone(),
                    task_type,
                    Some(assigned_to),
                    TaskData {
                        priority,
                        description,
                    },
                ))
            } else {
                None
            };

            processed.push(Processed { track, task });
        }

        (processed, stats)
    }
}

impl Default for Sentry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::BBox;
    use crate::models::task::TaskState;

    fn detection(label: &str, confidence: f64, geo: (f64, f64)) -> Detection {
        Detection::new(label, confidence, BBox(0, 0, 10, 10)).with_geo(geo.0, geo.1)
    }

    #[test]
    fn s1_high_confidence_airplane_cueing() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let dets = vec![detection("airplane", 0.92, (33.94, -118.40))];

        let (processed, stats) = sentry.process_detections(&dets, &assets);

        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.tasks, 1);
        assert_eq!(processed[0].track.ontology.platform_type, "Airplane");
        assert_eq!(processed[0].track.mil_view.environment, "ENVIRONMENT_AIR");
        assert_eq!(processed[0].track.confidence, 0.92);
        assert_eq!(processed[0].track.lifecycle_state.as_deref(), Some("TENTATIVE"));

        let task = processed[0].task.as_ref().unwrap();
        assert_eq!(task.task_type as u8, TaskType::VerificationRequest as u8);
        assert_eq!(task.data.priority as u8, Priority::High as u8);
        assert_eq!(task.assigned_to.as_deref(), Some("drone-alpha"));
        assert_eq!(task.state as u8, TaskState::Pending as u8);
    }

    #[test]
    fn s2_sub_threshold_detection_yields_no_task() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let dets = vec![detection("airplane", 0.70, (33.94, -118.40))];

        let (_processed, stats) = sentry.process_detections(&dets, &assets);
        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.tasks, 0);
    }

    #[test]
    fn s3_non_tactical_label_yields_no_task() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let dets = vec![detection("car", 0.95, (33.94, -118.40))];

        let (_processed, stats) = sentry.process_detections(&dets, &assets);
        assert_eq!(stats.tracks, 1);
        assert_eq!(stats.tasks, 0);
    }

    #[test]
    fn s4_loitering_cue() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();

        let mut dets: Vec<Detection> = (0..4)
            .map(|_| detection("truck", 0.40, (33.94, -118.41)))
            .collect();
        dets.push(detection("truck", 0.60, (33.94, -118.41)));

        let (processed, stats) = sentry.process_detections(&dets, &assets);

        assert_eq!(stats.tracks, 5);
        assert_eq!(stats.tasks, 1);
        let task = processed.last().unwrap().task.as_ref().unwrap();
        assert_eq!(task.task_type as u8, TaskType::AnomalyVerification as u8);
        assert_eq!(task.data.priority as u8, Priority::High as u8);
    }

    #[test]
    fn debounce_suppresses_second_task_within_window() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let dets = vec![
            detection("airplane", 0.92, (33.94, -118.40)),
            detection("airplane", 0.92, (33.9401, -118.4001)),
        ];

        let (_processed, stats) = sentry.process_detections(&dets, &assets);
        assert_eq!(stats.tracks, 2);
        assert_eq!(stats.tasks, 1);
    }

    #[test]
    fn same_physical_entity_keeps_stable_entity_id_across_detections() {
        let sentry = Sentry::new();
        let assets = AssetRegistry::new();
        let dets = vec![
            detection("truck", 0.5, (33.94, -118.41)),
            detection("truck", 0.5, (33.9401, -118.4101)),
        ];

        let (processed, _stats) = sentry.process_detections(&dets, &assets);
        assert_eq!(processed[0].track.entity_id, processed[1].track.entity_id);
    }
}
