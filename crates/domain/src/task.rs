//! Field operation tasks shown in the dashboard task list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Task list endpoint.
pub const TASK_PATH: &str = "/api/task";

/// Kind of field operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Aerial mapping flight.
    Mapping,
    /// Crop spraying flight.
    Spraying,
    /// A kind this client does not know yet.
    #[serde(other)]
    Other,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mapping => "mapping",
            Self::Spraying => "spraying",
            Self::Other => "other",
        };
        f.pad(s)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Scheduled, not started.
    #[default]
    Pending,
    /// In progress.
    Running,
    /// Finished.
    Done,
    /// A status this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// One task as returned by the backend.
///
/// The backend uses numeric ids while older clients treated them as
/// strings; both are accepted and kept as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task id.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Operation kind.
    #[serde(default, rename = "type")]
    pub kind: Option<TaskKind>,
    /// Current status.
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: TaskStatus,
    /// Field the task operates on.
    #[serde(default)]
    pub field_id: Option<i64>,
    /// Flight path assigned to the task.
    #[serde(default)]
    pub path_id: Option<i64>,
    /// Spray volume, for spraying tasks.
    #[serde(default)]
    pub volume: Option<f64>,
    /// ISO-8601 schedule time as sent by the backend.
    #[serde(default)]
    pub schedule_at: Option<String>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn status_or_default<'de, D>(deserializer: D) -> Result<TaskStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TaskStatus>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_task_from_backend_row() {
        let task: Task = serde_json::from_value(json!({
            "id": 7,
            "name": "North field",
            "description": "weekly survey",
            "type": "mapping",
            "field_id": 3,
            "path_id": null,
            "status": "running",
            "volume": null,
            "schedule_at": "2024-05-01T08:00:00",
            "created_at": "2024-04-30T10:00:00"
        }))
        .unwrap();

        assert_eq!(task.id, "7");
        assert_eq!(task.kind, Some(TaskKind::Mapping));
        assert_eq!(task.status, TaskStatus::Running);
        assert_eq!(task.field_id, Some(3));
        assert_eq!(task.path_id, None);
    }

    #[test]
    fn test_task_minimal_with_string_id() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "description": "spray",
            "status": "archived"
        }))
        .unwrap();

        assert_eq!(task.id, "t-1");
        assert_eq!(task.status, TaskStatus::Unknown);
        assert_eq!(task.kind, None);
    }

    #[test]
    fn test_task_null_status_is_pending() {
        let task: Task = serde_json::from_value(json!({"id": 1, "status": null})).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_task_rejects_object_id() {
        let result: Result<Task, _> = serde_json::from_value(json!({"id": {"x": 1}}));
        assert!(result.is_err());
    }
}
