//! Persistence repository (C10, spec.md §4.10).
//!
//! A narrow repository interface — the persistent store itself is an
//! external collaborator (spec.md §1); only this trait's shape is part of
//! the core design. [`sqlite_store::SqliteStore`] is the concrete,
//! spec-scoped implementation.

pub mod sqlite_store;

use crate::models::event::EventRow;
use crate::models::mission::Mission;
use crate::models::task::{Task, TaskState};

/// Repository operations needed by the sink, gateway, and HTTP handlers.
/// All reads return newest-first unless stated otherwise (spec.md §4.10).
pub trait Store: Send + Sync {
    fn add_event(
        &self,
        event_type: &str,
        entity_id: Option<&str>,
        data: &serde_json::Value,
    ) -> anyhow::Result<i64>;

    fn get_tracks(&self) -> anyhow::Result<Vec<EventRow>>;

    fn get_track_history(&self, entity_id: &str, limit: i64) -> anyhow::Result<Vec<EventRow>>;

    fn get_latest_events(&self, limit: i64) -> anyhow::Result<Vec<EventRow>>;

    fn add_task(&self, task: &Task) -> anyhow::Result<()>;

    fn get_task(&self, task_id: &str) -> anyhow::Result<Option<Task>>;

    fn get_tasks(&self, state: Option<TaskState>) -> anyhow::Result<Vec<Task>>;

    fn update_task_state(&self, task_id: &str, state: TaskState) -> anyhow::Result<bool>;

    fn set_task_assigned_to(&self, task_id: &str, assigned_to: &str) -> anyhow::Result<bool>;

    fn add_mission(&self, mission: &Mission) -> anyhow::Result<()>;

    fn get_missions(&self) -> anyhow::Result<Vec<Mission>>;
}
