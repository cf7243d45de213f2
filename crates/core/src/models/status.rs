use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Steps of a single check cycle. `Done` and `Errored` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPhase {
    Searching,
    Extracting,
    NoMatch,
    MatchFound,
    Notifying,
    Recording,
    Done,
    Errored,
}

impl CheckPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckPhase::Done | CheckPhase::Errored)
    }
}

/// What happened to the alert email of a check cycle that found matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Delivery {
    Sent,
    Failed(String),
    Skipped,
}

impl Delivery {
    pub fn email_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub request_id: String,
    pub kind: StatusKind,
    pub phase: CheckPhase,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(
        request_id: impl Into<String>,
        kind: StatusKind,
        phase: CheckPhase,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            kind,
            phase,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(
        request_id: impl Into<String>,
        phase: CheckPhase,
        message: impl Into<String>,
    ) -> Self {
        Self::new(request_id, StatusKind::Info, phase, message)
    }

    pub fn success(
        request_id: impl Into<String>,
        phase: CheckPhase,
        message: impl Into<String>,
    ) -> Self {
        Self::new(request_id, StatusKind::Success, phase, message)
    }

    pub fn error(
        request_id: impl Into<String>,
        phase: CheckPhase,
        message: impl Into<String>,
    ) -> Self {
        Self::new(request_id, StatusKind::Error, phase, message)
    }
}
