//! Persisted append-only event row (spec.md §3 `Event`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Track,
    Task,
    AssetTelemetry,
    TaskUpdate,
    TaskAck,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Track => "track",
            EventType::Task => "task",
            EventType::AssetTelemetry => "asset_telemetry",
            EventType::TaskUpdate => "task_update",
            EventType::TaskAck => "task_ack",
        }
    }
}

/// A row in the append-only `events` table, plus the tagged record form
/// used on the wire (spec.md §9: dynamic dicts become tagged records).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub entity_id: Option<String>,
    pub data: serde_json::Value,
    pub created_at: String,
}

/// In-memory event handed to the bus and to streaming subscribers. Not
/// itself persisted — the repository assigns `id`/`created_at` on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub entity_id: Option<String>,
    pub event_type: EventType,
    pub data: serde_json::Value,
}
