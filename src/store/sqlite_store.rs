//! SQLite-backed [`Store`] implementation.
//!
//! Mirrors the teacher's `ConfigDb`: a single `Mutex<Connection>`, schema
//! applied idempotently at construction, plain `rusqlite` queries.

use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::models::event::EventRow;
use crate::models::mission::{Geometry, Mission};
use crate::models::task::{Task, TaskData, TaskState, TaskType};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS events (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                type       TEXT NOT NULL,
                entity_id  TEXT,
                data       TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_events_type ON events(type);
            CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at);
            CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_id);

            CREATE TABLE IF NOT EXISTS tasks (
                id           TEXT PRIMARY KEY,
                entity_id    TEXT NOT NULL,
                type         TEXT NOT NULL,
                state        TEXT NOT NULL DEFAULT 'pending',
                assigned_to  TEXT,
                data         TEXT NOT NULL,
                created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
                updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_state ON tasks(state);
            CREATE INDEX IF NOT EXISTS idx_tasks_entity ON tasks(entity_id);

            CREATE TABLE IF NOT EXISTS missions (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                geometries TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_missions_created ON missions(created_at);
            ",
        )?;
        Ok(())
    }

    fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let task_type: String = row.get(2)?;
        let state: String = row.get(3)?;
        let data: String = row.get(5)?;
        Ok(Task {
            id: row.get(0)?,
            entity_id: row.get(1)?,
            task_type: TaskType::parse(&task_type).unwrap_or(TaskType::VerificationRequest),
            state: TaskState::parse(&state).unwrap_or(TaskState::Pending),
            assigned_to: row.get(4)?,
            data: serde_json::from_str::<TaskData>(&data).unwrap_or(TaskData {
                priority: crate::models::task::Priority::Medium,
                description: String::new(),
            }),
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl Store for SqliteStore {
    fn add_event(
        &self,
        event_type: &str,
        entity_id: Option<&str>,
        data: &serde_json::Value,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        let data_json = serde_json::to_string(data)?;
        conn.execute(
            "INSERT INTO events (type, entity_id, data) VALUES (?1, ?2, ?3)",
            params![event_type, entity_id, data_json],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_tracks(&self) -> anyhow::Result<Vec<EventRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, type, entity_id, data, created_at FROM events WHERE type = 'track' ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let data: String = row.get(3)?;
                Ok(EventRow {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    entity_id: row.get(2)?,
                    data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_track_history(&self, entity_id: &str, limit: i64) -> anyhow::Result<Vec<EventRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, type, entity_id, data, created_at FROM events \
             WHERE entity_id = ?1 AND type = 'track' ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![entity_id, limit], |row| {
                let data: String = row.get(3)?;
                Ok(EventRow {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    entity_id: row.get(2)?,
                    data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_latest_events(&self, limit: i64) -> anyhow::Result<Vec<EventRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, type, entity_id, data, created_at FROM events ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let data: String = row.get(3)?;
                Ok(EventRow {
                    id: row.get(0)?,
                    event_type: row.get(1)?,
                    entity_id: row.get(2)?,
                    data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn add_task(&self, task: &Task) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let data_json = serde_json::to_string(&task.data)?;
        conn.execute(
            "INSERT INTO tasks (id, entity_id, type, state, assigned_to, data, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id,
                task.entity_id,
                task.task_type.as_str(),
                task.state.as_str(),
                task.assigned_to,
                data_json,
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_task(&self, task_id: &str) -> anyhow::Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, entity_id, type, state, assigned_to, data, created_at, updated_at FROM tasks WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![task_id], Self::row_to_task)?;
        Ok(rows.next().transpose()?)
    }

    fn get_tasks(&self, state: Option<TaskState>) -> anyhow::Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let tasks = match state {
            Some(state) => {
                let mut stmt = conn.prepare(
                    "SELECT id, entity_id, type, state, assigned_to, data, created_at, updated_at \
                     FROM tasks WHERE state = ?1 ORDER BY created_at DESC",
                )?;
                stmt.query_map(params![state.as_str()], Self::row_to_task)?
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, entity_id, type, state, assigned_to, data, created_at, updated_at \
                     FROM tasks ORDER BY created_at DESC",
                )?;
                stmt.query_map([], Self::row_to_task)?
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(tasks)
    }

    fn update_task_state(&self, task_id: &str, state: TaskState) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute(
            "UPDATE tasks SET state = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ','now') WHERE id = ?1",
            params![task_id, state.as_str()],
        )?;
        Ok(count > 0)
    }

    fn set_task_assigned_to(&self, task_id: &str, assigned_to: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute(
            "UPDATE tasks SET assigned_to = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ','now') WHERE id = ?1",
            params![task_id, assigned_to],
        )?;
        Ok(count > 0)
    }

    fn add_mission(&self, mission: &Mission) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        let geometries_json = serde_json::to_string(&mission.geometries)?;
        conn.execute(
            "INSERT INTO missions (id, name, geometries, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![mission.id, mission.name, geometries_json, mission.created_at],
        )?;
        Ok(())
    }

    fn get_missions(&self) -> anyhow::Result<Vec<Mission>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, geometries, created_at FROM missions ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let geometries: String = row.get(2)?;
                Ok(Mission {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    geometries: serde_json::from_str::<Vec<Geometry>>(&geometries)
                        .unwrap_or_default(),
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;

    fn store() -> SqliteStore {
        SqliteStore::open(":memory:").unwrap()
    }

    #[test]
    fn add_and_read_track_events() {
        let s = store();
        s.add_event("track", Some("e1"), &serde_json::json!({"entityId": "e1"}))
            .unwrap();
        let tracks = s.get_tracks().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].entity_id.as_deref(), Some("e1"));
    }

    #[test]
    fn track_history_filters_by_entity_and_respects_limit() {
        let s = store();
        for i in 0..3 {
            s.add_event("track", Some("e1"), &serde_json::json!({"n": i}))
                .unwrap();
        }
        s.add_event("track", Some("e2"), &serde_json::json!({})).unwrap();

        let history = s.get_track_history("e1", 2).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.entity_id.as_deref() == Some("e1")));
    }

    #[test]
    fn task_lifecycle_round_trips() {
        let s = store();
        let task = Task::new(
            "t1".to_string(),
            "e1".to_string(),
            TaskType::VerificationRequest,
            Some("drone-alpha".to_string()),
            TaskData {
                priority: Priority::High,
                description: "Confirm airplane".to_string(),
            },
        );
        s.add_task(&task).unwrap();

        let fetched = s.get_task("t1").unwrap().unwrap();
        assert_eq!(fetched.entity_id, "e1");
        assert_eq!(fetched.data.description, "Confirm airplane");

        assert!(s.update_task_state("t1", TaskState::Assigned).unwrap());
        let fetched = s.get_task("t1").unwrap().unwrap();
        assert_eq!(fetched.state, TaskState::Assigned);

        assert!(!s.update_task_state("nope", TaskState::Assigned).unwrap());
    }

    #[test]
    fn get_tasks_filters_by_state() {
        let s = store();
        let pending = Task::new(
            "t1".to_string(),
            "e1".to_string(),
            TaskType::VerificationRequest,
            None,
            TaskData {
                priority: Priority::Medium,
                description: "d".to_string(),
            },
        );
        s.add_task(&pending).unwrap();
        s.update_task_state("t1", TaskState::Completed).unwrap();

        assert_eq!(s.get_tasks(None).unwrap().len(), 1);
        assert_eq!(s.get_tasks(Some(TaskState::Completed)).unwrap().len(), 1);
        assert_eq!(s.get_tasks(Some(TaskState::Pending)).unwrap().len(), 0);
    }

    #[test]
    fn missions_round_trip() {
        let s = store();
        let mission = Mission {
            id: "m1".to_string(),
            name: "patrol".to_string(),
            geometries: vec![Geometry {
                geometry_type: crate::models::mission::GeometryType::Point,
                coords: vec![vec![33.94, -118.40]],
                label: "waypoint".to_string(),
            }],
            created_at: crate::core::time::now_iso(),
        };
        s.add_mission(&mission).unwrap();
        let missions = s.get_missions().unwrap();
        assert_eq!(missions.len(), 1);
        assert_eq!(missions[0].name, "patrol");
    }
}
