//! Behavioral analytics over correlated track history (spec.md §4.5).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::geo::{distance_deg, meters_to_degrees};
use crate::core::track_state::TrackStateCache;
use crate::models::track::Track;

const LOITER_THRESHOLD_M: f64 = 50.0;
const LOITER_MIN_SAMPLES: usize = 5;
const FORMATION_RADIUS_M: f64 = 500.0;
const FORMATION_MIN_MEMBERS: usize = 3;

/// A cluster of co-located tracks reported by [`detect_formation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    #[serde(rename = "type")]
    pub formation_type: &'static str,
    pub member_count: usize,
    pub entity_ids: Vec<String>,
    pub centroid: (f64, f64),
}

/// True iff the entity's last [`LOITER_MIN_SAMPLES`] positions all sit within
/// `LOITER_THRESHOLD_M` of their centroid.
pub fn detect_loitering(cache: &TrackStateCache, entity_id: &str) -> bool {
    let history = cache.positions(entity_id);
    if history.len() < LOITER_MIN_SAMPLES {
        return false;
    }

    let n = history.len() as f64;
    let avg_lat = history.iter().map(|p| p.location.0).sum::<f64>() / n;
    let avg_lon = history.iter().map(|p| p.location.1).sum::<f64>() / n;
    let centroid = (avg_lat, avg_lon);

    let threshold_deg = meters_to_degrees(LOITER_THRESHOLD_M);
    let is_loitering = history
        .iter()
        .all(|p| distance_deg(p.location, centroid) <= threshold_deg);

    if is_loitering {
        info!(entity_id, "loitering behavior detected");
    }
    is_loitering
}

/// Clusters tracks into formations of at least [`FORMATION_MIN_MEMBERS`]
/// members within `FORMATION_RADIUS_M` of one another. Each track appears in
/// at most one formation.
pub fn detect_formation(tracks: &[Track]) -> Vec<Formation> {
    if tracks.len() < FORMATION_MIN_MEMBERS {
        return Vec::new();
    }

    let points: Vec<(String, (f64, f64))> = tracks
        .iter()
        .map(|t| {
            (
                t.entity_id.clone(),
                (
                    t.location.position.latitude_degrees,
                    t.location.position.longitude_degrees,
                ),
            )
        })
        .collect();

    let radius_deg = meters_to_degrees(FORMATION_RADIUS_M);
    let mut used = vec![false; points.len()];
    let mut formations = Vec::new();

    for i in 0..points.len() {
        if used[i] {
            continue;
        }
        let mut cluster = vec![i];
        for j in (i + 1)..points.len() {
            if used[j] {
                continue;
            }
            if distance_deg(points[i].1, points[j].1) <= radius_deg {
                cluster.push(j);
            }
        }
        if cluster.len() >= FORMATION_MIN_MEMBERS {
            for &idx in &cluster {
                used[idx] = true;
            }
            let n = cluster.len() as f64;
            let centroid_lat = cluster.iter().map(|&idx| points[idx].1 .0).sum::<f64>() / n;
            let centroid_lon = cluster.iter().map(|&idx| points[idx].1 .1).sum::<f64>() / n;
            formations.push(Formation {
                formation_type: "FORMATION",
                member_count: cluster.len(),
                entity_ids: cluster.iter().map(|&idx| points[idx].0.clone()).collect(),
                centroid: (centroid_lat, centroid_lon),
            });
        }
    }

    formations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::{BBox, Detection};

    fn track_at(lat: f64, lon: f64) -> Track {
        let d = Detection::new("car", 0.9, BBox(0, 0, 1, 1)).with_geo(lat, lon);
        Track::from_detection(&d)
    }

    #[test]
    fn loitering_requires_minimum_samples() {
        let cache = TrackStateCache::new();
        for _ in 0..4 {
            cache.update_position("e1", (33.94, -118.40));
        }
        assert!(!detect_loitering(&cache, "e1"));
    }

    #[test]
    fn loitering_detected_within_stationary_cluster() {
        let cache = TrackStateCache::new();
        for _ in 0..5 {
            cache.update_position("e1", (33.94000, -118.40000));
        }
        assert!(detect_loitering(&cache, "e1"));
    }

    #[test]
    fn distant_point_flips_loitering_to_false() {
        let cache = TrackStateCache::new();
        for _ in 0..4 {
            cache.update_position("e1", (33.94000, -118.40000));
        }
        cache.update_position("e1", (34.50000, -118.40000));
        assert!(!detect_loitering(&cache, "e1"));
    }

    #[test]
    fn formation_requires_three_tracks() {
        let tracks = vec![track_at(33.940, -118.400), track_at(33.941, -118.401)];
        assert!(detect_formation(&tracks).is_empty());
    }

    #[test]
    fn formation_s6_property() {
        let tracks = vec![
            track_at(33.940, -118.400),
            track_at(33.941, -118.401),
            track_at(33.942, -118.402),
        ];
        let formations = detect_formation(&tracks);
        assert_eq!(formations.len(), 1);
        let f = &formations[0];
        assert_eq!(f.member_count, 3);
        assert!((f.centroid.0 - 33.941).abs() < 0.001);
        assert!((f.centroid.1 - (-118.401)).abs() < 0.001);
    }

    #[test]
    fn each_track_reported_in_at_most_one_formation() {
        let tracks = vec![
            track_at(33.940, -118.400),
            track_at(33.9401, -118.4001),
            track_at(33.9402, -118.4002),
            track_at(34.500, -118.400),
            track_at(34.5001, -118.4001),
            track_at(34.5002, -118.4002),
        ];
        let formations = detect_formation(&tracks);
        assert_eq!(formations.len(), 2);
        let total_members: usize = formations.iter().map(|f| f.member_count).sum();
        assert_eq!(total_members, 6);
    }
}
