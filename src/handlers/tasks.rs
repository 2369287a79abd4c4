use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::core::time::now_iso;
use crate::models::event::{BusEvent, EventType};
use crate::models::task::TaskState;
use crate::AppState;

/// Legacy error shape for an unknown-resource lookup: HTTP 200 with a
/// `{status:"error", message}` body (spec.md §7 — preserved deliberately).
fn unknown_task_error(task_id: &str) -> serde_json::Value {
    serde_json::json!({ "status": "error", "message": format!("task {task_id} not found") })
}

#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    state: Option<String>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Result<Json<Vec<crate::models::task::Task>>, (StatusCode, String)> {
    let filter = match params.state.as_deref() {
        Some(s) => Some(
            TaskState::parse(s)
                .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown task state: {s}")))?,
        ),
        None => None,
    };
    let tasks = state
        .store
        .get_tasks(filter)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(tasks))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStateParams {
    state: String,
}

pub async fn update_task_state(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(params): Query<UpdateStateParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let new_state = TaskState::parse(&params.state)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown task state: {}", params.state)))?;

    let updated = state
        .store
        .update_task_state(&task_id, new_state)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if !updated {
        return Ok(Json(unknown_task_error(&task_id)));
    }

    let Some(task) = state
        .store
        .get_task(&task_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    else {
        return Ok(Json(unknown_task_error(&task_id)));
    };

    let event_data = serde_json::json!({
        "task_id": task_id,
        "state": new_state.as_str(),
    });
    state
        .store
        .add_event("task_update", Some(&task.entity_id), &event_data)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    state.bus.publish(BusEvent {
        entity_id: Some(task.entity_id.clone()),
        event_type: EventType::TaskUpdate,
        data: event_data,
    });

    Ok(Json(
        serde_json::json!({ "status": "updated", "task_id": task_id, "state": new_state.as_str() }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AckParams {
    operator_id: String,
}

pub async fn acknowledge_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(params): Query<AckParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let Some(task) = state
        .store
        .get_task(&task_id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    else {
        return Ok(Json(unknown_task_error(&task_id)));
    };

    if matches!(task.state, TaskState::Pending) {
        state
            .store
            .set_task_assigned_to(&task_id, &params.operator_id)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        state
            .store
            .update_task_state(&task_id, TaskState::Assigned)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    }

    let event_data = serde_json::json!({
        "task_id": task_id,
        "operator_id": params.operator_id,
        "acknowledged_at": now_iso(),
    });
    state
        .store
        .add_event("task_ack", Some(&task.entity_id), &event_data)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    state.bus.publish(BusEvent {
        entity_id: Some(task.entity_id.clone()),
        event_type: EventType::TaskAck,
        data: event_data,
    });

    Ok(Json(serde_json::json!({ "status": "acknowledged", "task_id": task_id })))
}
