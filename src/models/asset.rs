//! Tactical asset state (spec.md §3 `Asset`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Uav,
    Ugv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Idle,
    Tasked,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Air,
    Land,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub location: (f64, f64),
    pub status: AssetStatus,
    pub domain: Domain,
    pub battery: f64,
    pub signal: f64,
    pub current_task_id: Option<String>,
    pub last_heartbeat: Option<String>,
}

impl Asset {
    pub fn new(id: &str, asset_type: AssetType, location: (f64, f64), domain: Domain) -> Self {
        Asset {
            id: id.to_string(),
            asset_type,
            location,
            status: AssetStatus::Idle,
            domain,
            battery: 1.0,
            signal: 1.0,
            current_task_id: None,
            last_heartbeat: None,
        }
    }
}
