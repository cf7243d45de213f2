//! Per-request progress reporting.
//!
//! The check pipeline publishes a [`StatusEvent`] at every phase change. The
//! [`StatusBoard`] keeps the latest event per watch request, which is what a
//! dashboard shows next to each request.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use teewatch_core::models::StatusEvent;
use tracing::debug;

/// Receiver of check progress events.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

/// Latest status per watch request.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    latest: Arc<RwLock<HashMap<String, StatusEvent>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, request_id: &str) -> Option<StatusEvent> {
        let latest = self.latest.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        latest.get(request_id).cloned()
    }

    /// Forgets a request, e.g. after it was deleted.
    pub fn clear(&self, request_id: &str) -> Option<StatusEvent> {
        let mut latest = self.latest.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        latest.remove(request_id)
    }

    pub fn snapshot(&self) -> HashMap<String, StatusEvent> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl StatusSink for StatusBoard {
    fn publish(&self, event: StatusEvent) {
        debug!(
            request_id = %event.request_id,
            phase = ?event.phase,
            kind = ?event.kind,
            "{}",
            event.message
        );
        let mut latest = self.latest.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        latest.insert(event.request_id.clone(), event);
    }
}
