//! Tactical asset fleet registry, scoring and assignment (C7, spec.md §4.7).

use std::sync::Mutex;

use crate::core::geo::distance_deg;
use crate::core::time::now_iso;
use crate::models::asset::{Asset, AssetStatus, AssetType, Domain};

const DISTANCE_WEIGHT: f64 = 0.4;
const BATTERY_WEIGHT: f64 = 0.3;
const SIGNAL_WEIGHT: f64 = 0.3;
const DISTANCE_NORMALIZER: f64 = 0.1;

fn score(asset: &Asset, target: (f64, f64)) -> f64 {
    let distance = distance_deg(asset.location, target);
    let distance_score = (1.0 - distance / DISTANCE_NORMALIZER).max(0.0);
    DISTANCE_WEIGHT * distance_score + BATTERY_WEIGHT * asset.battery + SIGNAL_WEIGHT * asset.signal
}

/// Holds the fleet's live state. Exclusively owns asset records — spec.md §3
/// Ownership.
pub struct AssetRegistry {
    assets: Mutex<Vec<Asset>>,
}

impl AssetRegistry {
    /// Seeds the mock fleet: two air UAVs and one land UGV.
    pub fn new() -> Self {
        let assets = vec![
            Asset::new(
                "drone-alpha",
                AssetType::Uav,
                (33.94, -118.41),
                Domain::Air,
            ),
            Asset::new("drone-beta", AssetType::Uav, (33.95, -118.40), Domain::Air),
            Asset::new("ugv-sierra", AssetType::Ugv, (33.93, -118.42), Domain::Land),
        ];
        AssetRegistry {
            assets: Mutex::new(assets),
        }
    }

    pub fn list(&self) -> Vec<Asset> {
        self.assets.lock().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<Asset> {
        self.assets.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn get_available_assets(&self) -> Vec<Asset> {
        self.assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| matches!(a.status, AssetStatus::Idle))
            .cloned()
            .collect()
    }

    /// Returns the best-scoring asset in `pool` for `target`, or `None` if
    /// the pool is empty. Ties are broken by pool order (first max wins).
    pub fn assign_asset(&self, target: (f64, f64), pool: &[Asset]) -> Option<Asset> {
        pool.iter()
            .fold(None::<(&Asset, f64)>, |best, candidate| {
                let candidate_score = score(candidate, target);
                match best {
                    Some((_, best_score)) if best_score >= candidate_score => best,
                    _ => Some((candidate, candidate_score)),
                }
            })
            .map(|(asset, _)| asset.clone())
    }

    pub fn update_telemetry(&self, id: &str, lat: f64, lon: f64, battery: f64, signal: f64) -> bool {
        let mut assets = self.assets.lock().unwrap();
        match assets.iter_mut().find(|a| a.id == id) {
            Some(asset) => {
                asset.location = (lat, lon);
                asset.battery = battery;
                asset.signal = signal;
                asset.last_heartbeat = Some(now_iso());
                true
            }
            None => false,
        }
    }

    pub fn set_status(&self, id: &str, status: AssetStatus, current_task_id: Option<String>) -> bool {
        let mut assets = self.assets.lock().unwrap();
        match assets.iter_mut().find(|a| a.id == id) {
            Some(asset) => {
                asset.status = status;
                asset.current_task_id = current_task_id;
                true
            }
            None => false,
        }
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s7_scoring_favors_battery_and_signal_over_small_distance_gap() {
        let target = (33.94, -118.41);
        let close_low_power = Asset {
            battery: 0.1,
            signal: 1.0,
            ..Asset::new("a", AssetType::Uav, target, Domain::Air)
        };
        let farther_high_power = Asset {
            battery: 1.0,
            signal: 1.0,
            ..Asset::new("b", AssetType::Uav, (target.0 + 0.01, target.1), Domain::Air)
        };
        assert!(score(&farther_high_power, target) > score(&close_low_power, target));
    }

    #[test]
    fn score_is_non_increasing_in_distance() {
        let target = (33.94, -118.41);
        let near = Asset::new("near", AssetType::Uav, target, Domain::Air);
        let far = Asset::new("far", AssetType::Uav, (target.0 + 0.05, target.1), Domain::Air);
        assert!(score(&near, target) >= score(&far, target));
    }

    #[test]
    fn score_is_non_decreasing_in_battery_and_signal() {
        let target = (0.0, 0.0);
        let base = Asset::new("a", AssetType::Uav, target, Domain::Air);
        let mut low = base.clone();
        low.battery = 0.2;
        low.signal = 0.2;
        let mut high = base.clone();
        high.battery = 0.9;
        high.signal = 0.9;
        assert!(score(&high, target) >= score(&low, target));
    }

    #[test]
    fn seed_fleet_has_three_assets() {
        let registry = AssetRegistry::new();
        assert_eq!(registry.list().len(), 3);
    }

    #[test]
    fn available_assets_filters_idle() {
        let registry = AssetRegistry::new();
        registry.set_status("drone-alpha", AssetStatus::Tasked, Some("t1".to_string()));
        let available = registry.get_available_assets();
        assert_eq!(available.len(), 2);
        assert!(available.iter().all(|a| a.id != "drone-alpha"));
    }

    #[test]
    fn assign_picks_closest_high_battery_asset() {
        let registry = AssetRegistry::new();
        let pool = registry.get_available_assets();
        let assigned = registry.assign_asset((33.94, -118.41), &pool).unwrap();
        assert_eq!(assigned.id, "drone-alpha");
    }

    #[test]
    fn assign_returns_none_for_empty_pool() {
        let registry = AssetRegistry::new();
        assert!(registry.assign_asset((0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn update_telemetry_replaces_fields_and_stamps_heartbeat() {
        let registry = AssetRegistry::new();
        assert!(registry.update_telemetry("ugv-sierra", 34.0, -118.0, 0.4, 0.6));
        let asset = registry.get("ugv-sierra").unwrap();
        assert_eq!(asset.location, (34.0, -118.0));
        assert_eq!(asset.battery, 0.4);
        assert!(asset.last_heartbeat.is_some());
    }

    #[test]
    fn update_telemetry_unknown_id_returns_false() {
        let registry = AssetRegistry::new();
        assert!(!registry.update_telemetry("nope", 0.0, 0.0, 1.0, 1.0));
    }
}
