use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Outbound message: `{ "token": ..., "notification": { "title", "body" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub notification: Notification,
}

/// Aggregate result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

impl DispatchOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}
