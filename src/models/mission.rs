//! Mission geometry overlays (spec.md §3 `Mission`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Polygon,
    Linestring,
    Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,
    pub coords: Vec<Vec<f64>>,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub geometries: Vec<Geometry>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMissionRequest {
    pub name: String,
    pub geometries: Vec<Geometry>,
}
