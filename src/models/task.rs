//! Cueing task issued against a tactical asset (spec.md §3 `Task`).

use serde::{Deserialize, Serialize};

use crate::core::time::now_iso;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    VerificationRequest,
    AnomalyVerification,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::VerificationRequest => "VERIFICATION_REQUEST",
            TaskType::AnomalyVerification => "ANOMALY_VERIFICATION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VERIFICATION_REQUEST" => Some(TaskType::VerificationRequest),
            "ANOMALY_VERIFICATION" => Some(TaskType::AnomalyVerification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Assigned => "assigned",
            TaskState::InProgress => "in_progress",
            TaskState::Completed => "completed",
            TaskState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskState::Pending),
            "assigned" => Some(TaskState::Assigned),
            "in_progress" => Some(TaskState::InProgress),
            "completed" => Some(TaskState::Completed),
            "cancelled" => Some(TaskState::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskData {
    pub priority: Priority,
    pub description: String,
}

/// Row persisted by [`crate::store::Store`] and rendered to handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub entity_id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub state: TaskState,
    pub assigned_to: Option<String>,
    pub data: TaskData,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn new(
        id: String,
        entity_id: String,
        task_type: TaskType,
        assigned_to: Option<String>,
        data: TaskData,
    ) -> Self {
        let now = now_iso();
        Task {
            id,
            entity_id,
            task_type,
            state: TaskState::Pending,
            assigned_to,
            data,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
