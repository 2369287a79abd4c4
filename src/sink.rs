//! Lattice publishing sink (spec.md §9: "the production design splits bus,
//! repository, and sink cleanly: the sink depends on both, neither depends
//! on the sink").
//!
//! Mirrors the upstream `LatticeConnector`'s dev/prod split: `dev` persists
//! through the repository and fans out on the bus; `prod` does the same and
//! additionally forwards to the downstream Lattice endpoint, a fatal error
//! for the caller's batch if that forward fails (spec.md §7).

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::core::events::EventBus;
use crate::models::event::{BusEvent, EventType};
use crate::models::task::Task;
use crate::models::track::Track;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    Dev,
    Prod,
}

/// Typed construction-time failure (spec.md §7: "Configuration missing in
/// prod" is its own error class, distinct from the runtime forward failures
/// below) — callers that want to distinguish it from a generic `anyhow`
/// chain can match on the variant instead of string-matching a message.
#[derive(Debug, Error)]
pub enum SinkConfigError {
    #[error(
        "LATTICE_ENDPOINT environment variable required for prod mode. \
         Expected format: https://lattice.example.com"
    )]
    MissingLatticeEndpoint,
}

/// Publishes tracks and tasks to the durable store (C10) and the event bus
/// (C9), and — in `prod` mode — to the downstream Lattice production
/// connector. Holds no `AppState`; callers construct it once at startup.
pub struct Sink {
    mode: SinkMode,
    store: Arc<dyn Store>,
    bus: Arc<EventBus>,
    lattice_endpoint: Option<String>,
    http: Option<reqwest::Client>,
}

impl Sink {
    /// `prod` without `lattice_endpoint` is a fatal configuration error,
    /// raised here at construction, before serving traffic (spec.md §6, §7).
    pub fn new(
        mode: SinkMode,
        store: Arc<dyn Store>,
        bus: Arc<EventBus>,
        lattice_endpoint: Option<String>,
    ) -> anyhow::Result<Self> {
        if mode == SinkMode::Prod && lattice_endpoint.is_none() {
            return Err(SinkConfigError::MissingLatticeEndpoint.into());
        }
        let http = (mode == SinkMode::Prod).then(reqwest::Client::new);
        Ok(Sink {
            mode,
            store,
            bus,
            lattice_endpoint,
            http,
        })
    }

    pub fn mode(&self) -> SinkMode {
        self.mode
    }

    /// Persist a track, fan it out on the bus, and — in prod — forward it
    /// downstream. The persistence write always happens first; a prod
    /// forward failure is returned to the caller and does not unwind the
    /// write that already committed.
    pub async fn publish_track(&self, track: &Track) -> anyhow::Result<()> {
        let data = serde_json::to_value(track)?;
        self.store.add_event("track", Some(&track.entity_id), &data)?;
        self.bus.publish(BusEvent {
            entity_id: Some(track.entity_id.clone()),
            event_type: EventType::Track,
            data: data.clone(),
        });
        if self.mode == SinkMode::Prod {
            self.forward_to_lattice("track", &track.entity_id, &data)
                .await?;
        }
        Ok(())
    }

    /// Persist a task row plus its `task` timeline event, and fan it out.
    pub async fn publish_task(&self, task: &Task) -> anyhow::Result<()> {
        self.store.add_task(task)?;
        let data = serde_json::to_value(task)?;
        self.store.add_event("task", Some(&task.entity_id), &data)?;
        self.bus.publish(BusEvent {
            entity_id: Some(task.entity_id.clone()),
            event_type: EventType::Task,
            data: data.clone(),
        });
        if self.mode == SinkMode::Prod {
            self.forward_to_lattice("task", &task.entity_id, &data)
                .await?;
        }
        Ok(())
    }

    async fn forward_to_lattice(
        &self,
        kind: &str,
        entity_id: &str,
        data: &Value,
    ) -> anyhow::Result<()> {
        let endpoint = self
            .lattice_endpoint
            .as_ref()
            .expect("prod mode always carries a lattice_endpoint, checked at construction");
        let client = self
            .http
            .as_ref()
            .expect("prod mode always carries an http client, checked at construction");

        let response = client
            .post(format!("{endpoint}/{kind}"))
            .json(data)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(entity_id, kind, "forwarded to lattice");
                Ok(())
            }
            Ok(resp) => {
                anyhow::bail!("lattice endpoint {endpoint} responded {}", resp.status())
            }
            Err(err) => {
                tracing::error!(entity_id, kind, %err, "lattice forward failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detection::{BBox, Detection};
    use crate::models::task::{Priority, TaskData, TaskType};
    use crate::store::sqlite_store::SqliteStore;

    fn sink(mode: SinkMode, endpoint: Option<String>) -> anyhow::Result<Sink> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(":memory:").unwrap());
        let bus = Arc::new(EventBus::new());
        Sink::new(mode, store, bus, endpoint)
    }

    #[test]
    fn prod_without_endpoint_fails_at_construction() {
        assert!(sink(SinkMode::Prod, None).is_err());
    }

    #[test]
    fn prod_with_endpoint_constructs() {
        assert!(sink(SinkMode::Prod, Some("https://lattice.example.com".into())).is_ok());
    }

    #[tokio::test]
    async fn dev_mode_persists_track_and_publishes() {
        let sink = sink(SinkMode::Dev, None).unwrap();
        let (_id, mut rx) = sink.bus.subscribe();

        let detection = Detection::new("airplane", 0.9, BBox(0, 0, 1, 1)).with_geo(33.94, -118.40);
        let track = Track::from_detection(&detection);
        sink.publish_track(&track).await.unwrap();

        assert_eq!(sink.store.get_tracks().unwrap().len(), 1);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn dev_mode_persists_task() {
        let sink = sink(SinkMode::Dev, None).unwrap();
        let task = Task::new(
            uuid::Uuid::new_v4().to_string(),
            "e1".to_string(),
            TaskType::VerificationRequest,
            Some("drone-alpha".to_string()),
            TaskData {
                priority: Priority::High,
                description: "Confirm airplane".to_string(),
            },
        );
        sink.publish_task(&task).await.unwrap();
        assert!(sink.store.get_task(&task.id).unwrap().is_some());
    }
}
