use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::event::EventRow;
use crate::AppState;

const TIMELINE_LIMIT: i64 = 100;

pub async fn get_timeline(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRow>>, (StatusCode, String)> {
    let events = state
        .store
        .get_latest_events(TIMELINE_LIMIT)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(events))
}
