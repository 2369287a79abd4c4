//! Streaming gateway (C11, spec.md §4.11).
//!
//! On subscribe: accept the client, replay the current tracks and one
//! `asset_telemetry` frame per known asset, then attach a bounded
//! per-subscriber queue to the bus and forward events until disconnect.
//! Snapshot-then-stream is not atomic (spec.md §5): a client may see a
//! track in the snapshot and again as a live event; clients must be
//! idempotent on `entityId`.

use std::sync::Arc;

use serde_json::Value;

use crate::core::assets::AssetRegistry;
use crate::core::cot::to_cursor_on_target;
use crate::core::events::{EventBus, SubscriberId};
use crate::models::event::{BusEvent, EventType};
use crate::models::track::Track;
use crate::store::Store;

/// Tag a bus event's data with its `type` discriminator for the wire
/// (spec.md §9: dynamic dicts become tagged records). `Track` events are
/// left bare — the `Track` schema (spec.md §3) has no `type` field and
/// tracks are already self-describing via `ontology.platform_type`; every
/// other event kind needs the tag so a client can multiplex them.
pub fn tagged(event: &BusEvent) -> Value {
    if matches!(event.event_type, EventType::Track) {
        return event.data.clone();
    }
    match event.data.clone() {
        Value::Object(mut map) => {
            map.insert(
                "type".to_string(),
                Value::String(event.event_type.as_str().to_string()),
            );
            Value::Object(map)
        }
        other => other,
    }
}

fn asset_telemetry_frame(asset: &crate::models::asset::Asset) -> anyhow::Result<Value> {
    let mut data = serde_json::to_value(asset)?;
    if let Value::Object(map) = &mut data {
        map.insert(
            "type".to_string(),
            Value::String(EventType::AssetTelemetry.as_str().to_string()),
        );
    }
    Ok(data)
}

/// Bridges the repository, asset fleet and bus for the two streaming
/// endpoints (`/ws/tracks`, `/ws/cot`). Holds no client transport itself.
pub struct Gateway {
    store: Arc<dyn Store>,
    bus: Arc<EventBus>,
    assets: Arc<AssetRegistry>,
}

impl Gateway {
    pub fn new(store: Arc<dyn Store>, bus: Arc<EventBus>, assets: Arc<AssetRegistry>) -> Self {
        Gateway { store, bus, assets }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Snapshot frames for `/ws/tracks`: every current track, tagged, then
    /// one `asset_telemetry` frame per known asset.
    pub fn tracks_snapshot(&self) -> anyhow::Result<Vec<Value>> {
        let mut frames: Vec<Value> = self
            .store
            .get_tracks()?
            .into_iter()
            .map(|row| row.data)
            .collect();
        for asset in self.assets.list() {
            frames.push(asset_telemetry_frame(&asset)?);
        }
        Ok(frames)
    }

    /// Snapshot frames for `/ws/cot`: every current track rendered as CoT
    /// XML. Malformed track rows are skipped (spec.md §7).
    pub fn cot_snapshot(&self) -> anyhow::Result<Vec<String>> {
        let rows = self.store.get_tracks()?;
        let mut frames = Vec::with_capacity(rows.len());
        for row in rows {
            if let Ok(track) = serde_json::from_value::<Track>(row.data) {
                frames.push(to_cursor_on_target(&track));
            }
        }
        Ok(frames)
    }

    /// Register a new subscriber with the bus.
    pub fn subscribe(&self) -> (SubscriberId, tokio::sync::mpsc::Receiver<BusEvent>) {
        self.bus.subscribe()
    }

    /// Detach a subscriber, discarding any unread items.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.bus.unsubscribe(id);
    }
}
