use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Running,
    Paused,
}

/// The single persisted record describing the current focus countdown.
///
/// At most one instance exists at a time; starting a new session replaces
/// any prior one. `paused_at` is present if and only if the session is
/// paused. Resuming shifts `start_time` forward by the paused interval so
/// that `elapsed = now - start_time` stays correct without tracking
/// accumulated elapsed time separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// Epoch milliseconds marking when elapsed-time accounting began.
    pub start_time: i64,
    /// Total intended session length in minutes.
    pub duration: i64,
    pub status: SessionStatus,
    /// Epoch milliseconds of when the pause began, set only while paused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
}

impl ActiveSession {
    /// Total intended session length in whole seconds.
    pub fn target_secs(&self) -> i64 {
        self.duration * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_persisted_shape() {
        let session = ActiveSession {
            start_time: 1_700_000_000_000,
            duration: 25,
            status: SessionStatus::Running,
            paused_at: None,
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["startTime"], 1_700_000_000_000_i64);
        assert_eq!(json["duration"], 25);
        assert_eq!(json["status"], "running");
        assert!(json.get("pausedAt").is_none());
    }

    #[test]
    fn deserializes_paused_session() {
        let json = r#"{"startTime":100,"duration":25,"status":"paused","pausedAt":5000}"#;
        let session: ActiveSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.paused_at, Some(5000));
        assert_eq!(session.target_secs(), 1500);
    }
}
