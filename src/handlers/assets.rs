use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::core::time::now_iso;
use crate::models::event::{BusEvent, EventType};
use crate::AppState;

pub async fn get_assets(
    State(state): State<AppState>,
) -> Json<Vec<crate::models::asset::Asset>> {
    Json(state.assets.list())
}

#[derive(Debug, Deserialize)]
pub struct TelemetryParams {
    asset_id: String,
    lat: f64,
    lon: f64,
    battery: f64,
    signal: f64,
}

pub async fn update_asset_telemetry(
    State(state): State<AppState>,
    Query(params): Query<TelemetryParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let updated = state.assets.update_telemetry(
        &params.asset_id,
        params.lat,
        params.lon,
        params.battery,
        params.signal,
    );
    if !updated {
        // spec.md §7: unknown asset on lookup is a structured error at
        // HTTP 200, not a 404 — legacy behavior must be preserved.
        return Ok(Json(serde_json::json!({
            "status": "error",
            "message": format!("asset {} not found", params.asset_id),
        })));
    }

    let asset = state
        .assets
        .get(&params.asset_id)
        .expect("just updated, asset must exist");
    let mut data = serde_json::to_value(&asset).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    if let serde_json::Value::Object(map) = &mut data {
        map.insert("observed_at".to_string(), serde_json::Value::String(now_iso()));
    }

    state.bus.publish(BusEvent {
        entity_id: None,
        event_type: EventType::AssetTelemetry,
        data,
    });

    Ok(Json(serde_json::json!({ "status": "updated", "asset_id": params.asset_id })))
}
