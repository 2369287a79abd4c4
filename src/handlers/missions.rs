use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::core::time::now_iso;
use crate::models::mission::{CreateMissionRequest, Mission};
use crate::AppState;

pub async fn get_missions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Mission>>, (StatusCode, String)> {
    let missions = state
        .store
        .get_missions()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(missions))
}

pub async fn create_mission(
    State(state): State<AppState>,
    Json(request): Json<CreateMissionRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let mission = Mission {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        geometries: request.geometries,
        created_at: now_iso(),
    };
    state
        .store
        .add_mission(&mission)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(serde_json::json!({ "status": "ok", "mission_id": mission.id })))
}
