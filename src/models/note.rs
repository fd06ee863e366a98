use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A freshly created, empty note.
    pub fn untitled(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Untitled Note".into(),
            content: String::new(),
            updated_at: now,
        }
    }
}
