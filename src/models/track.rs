//! Publishable snapshot of a correlated entity, Lattice-compatible shape
//! (spec.md §3 `Track`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::detection::Detection;
use crate::core::time::now_iso;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "latitudeDegrees")]
    pub latitude_degrees: f64,
    #[serde(rename = "longitudeDegrees")]
    pub longitude_degrees: f64,
    #[serde(rename = "altitudeHaeMeters")]
    pub altitude_hae_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ontology {
    pub platform_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilView {
    pub disposition: String,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(rename = "integrationName")]
    pub integration_name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "sourceUpdateTime")]
    pub source_update_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub description: String,
    pub ontology: Ontology,
    pub location: Location,
    #[serde(rename = "milView")]
    pub mil_view: MilView,
    pub provenance: Provenance,
    pub confidence: f64,
    #[serde(rename = "isLive")]
    pub is_live: bool,
    #[serde(rename = "createdTime")]
    pub created_time: String,
    #[serde(rename = "expiryTime", skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
    #[serde(rename = "lifecycleState", skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

impl Track {
    /// Build a `Track` from a raw detection, assigning a fresh `entityId`.
    /// Mirrors the upstream `TrackBuilder.from_detection` builder.
    pub fn from_detection(detection: &Detection) -> Self {
        Track::from_correlated(Uuid::new_v4().to_string(), detection)
    }

    /// Build a `Track` from a raw detection, reusing an `entityId` already
    /// assigned by entity correlation (C4) so repeat observations of the
    /// same physical object accumulate under one id.
    pub fn from_correlated(entity_id: String, detection: &Detection) -> Self {
        let (lat, lon) = detection.geo_location.unwrap_or((0.0, 0.0));
        let now = now_iso();
        Track {
            entity_id,
            description: format!("Detected {}", detection.label),
            ontology: Ontology {
                platform_type: capitalize(&detection.label),
            },
            location: Location {
                position: Position {
                    latitude_degrees: lat,
                    longitude_degrees: lon,
                    altitude_hae_meters: 0.0,
                },
            },
            mil_view: MilView {
                disposition: "DISPOSITION_UNKNOWN".to_string(),
                environment: if detection.label == "airplane" {
                    "ENVIRONMENT_AIR".to_string()
                } else {
                    "ENVIRONMENT_LAND".to_string()
                },
            },
            provenance: Provenance {
                integration_name: "ghost-sentry".to_string(),
                data_type: "detection".to_string(),
                source_update_time: now.clone(),
            },
            confidence: detection.confidence,
            is_live: true,
            created_time: now,
            expiry_time: None,
            lifecycle_state: None,
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::BBox;

    #[test]
    fn airplane_gets_air_environment() {
        let d = Detection::new("airplane", 0.92, BBox(0, 0, 1, 1)).with_geo(33.94, -118.40);
        let t = Track::from_detection(&d);
        assert_eq!(t.ontology.platform_type, "Airplane");
        assert_eq!(t.mil_view.environment, "ENVIRONMENT_AIR");
        assert_eq!(t.location.position.latitude_degrees, 33.94);
    }

    #[test]
    fn truck_gets_land_environment() {
        let d = Detection::new("truck", 0.6, BBox(0, 0, 1, 1));
        let t = Track::from_detection(&d);
        assert_eq!(t.mil_view.environment, "ENVIRONMENT_LAND");
    }
}
