use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::AppState;

pub async fn get_tracks(
    State(state): State<AppState>,
) -> Result<Json<Vec<serde_json::Value>>, (StatusCode, String)> {
    let rows = state
        .store
        .get_tracks()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(rows.into_iter().map(|row| row.data).collect()))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    limit: Option<i64>,
}

pub async fn get_track_history(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<serde_json::Value>>, (StatusCode, String)> {
    let limit = params.limit.unwrap_or(10);
    let rows = state
        .store
        .get_track_history(&entity_id, limit)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let frames = rows
        .into_iter()
        .map(|row| serde_json::json!({ "data": row.data, "created_at": row.created_at }))
        .collect();
    Ok(Json(frames))
}

pub async fn get_tracks_cot(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, String)> {
    let xml = state
        .gateway
        .cot_snapshot()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .join("\n");
    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        xml,
    )
        .into_response())
}
