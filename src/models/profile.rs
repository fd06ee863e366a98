use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub title: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Student".into(),
            title: "User".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub streak: u32,
    pub tasks_completed: u32,
}
