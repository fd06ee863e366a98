use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category a task belongs to. Serialized capitalized to match the
/// persisted document ("Academic", "Freelance", ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskTag {
    Academic,
    Freelance,
    Club,
    Personal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub tag: TaskTag,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Completion percentage, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String, tag: TaskTag, priority: TaskPriority, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            tag,
            priority,
            status: TaskStatus::Todo,
            description: None,
            progress: None,
            remarks: None,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_encodings_match_document() {
        let task = Task::new(
            "Finish problem set".into(),
            TaskTag::Academic,
            TaskPriority::default(),
            Utc::now(),
        );

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["tag"], "Academic");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["status"], "todo");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn in_progress_uses_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in_progress"
        );
    }
}
