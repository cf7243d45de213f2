//! Runs check cycles with a per-request in-flight guard and a global
//! concurrency limit.
//!
//! Two overlapping cycles for the same watch request would each record the
//! same matches, so a second check for an id that is already being checked is
//! rejected with [`WatchError::AlreadyChecking`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use teewatch_core::{
    errors::{WatchError, WatchResult},
    models::WatchRequest,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::checker::{CheckOutcome, Checker};

/// Ids of the watch requests currently being checked.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Marks `id` as in flight. Returns `None` if it already is.
    pub fn try_acquire(&self, id: &str) -> Option<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !ids.insert(id.to_string()) {
            return None;
        }

        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        let ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.contains(id)
    }
}

/// Releases the in-flight mark when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut ids = self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.remove(&self.id);
    }
}

/// Counts over the results of a batch of checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub with_matches: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_results(results: &[(String, WatchResult<CheckOutcome>)]) -> Self {
        results.iter().fold(Self::default(), |mut summary, (_, result)| {
            match result {
                Ok(outcome) if outcome.is_error() => summary.errored += 1,
                Ok(outcome) if !outcome.matches.is_empty() => summary.with_matches += 1,
                Ok(_) => {}
                Err(WatchError::AlreadyChecking(_)) => summary.skipped += 1,
                Err(_) => summary.errored += 1,
            }
            if matches!(result, Ok(_)) {
                summary.checked += 1;
            }
            summary
        })
    }
}

#[derive(Clone)]
pub struct CheckRunner {
    checker: Arc<Checker>,
    in_flight: InFlight,
    limiter: Arc<Semaphore>,
}

impl CheckRunner {
    /// `max_concurrent` is clamped to at least one.
    pub fn new(checker: Arc<Checker>, max_concurrent: usize) -> Self {
        Self {
            checker,
            in_flight: InFlight::default(),
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Checks one request unless a check for the same id is already running.
    pub async fn check(&self, request: &WatchRequest) -> WatchResult<CheckOutcome> {
        let _guard = self
            .in_flight
            .try_acquire(&request.id)
            .ok_or_else(|| WatchError::AlreadyChecking(request.id.clone()))?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| WatchError::Internal(Box::new(e)))?;

        Ok(self.checker.check_one(request).await)
    }

    /// Looks `id` up in the store and checks it.
    pub async fn check_by_id(&self, id: &str) -> WatchResult<CheckOutcome> {
        let request = self
            .checker
            .store()
            .find_request(id)
            .await
            .ok_or_else(|| {
                WatchError::NotFound(format!("Watch request with ID {} not found", id))
            })?;

        self.check(&request).await
    }

    /// Checks every request as an independent cycle, at most
    /// `max_concurrent` at a time. Results come back in completion order.
    pub async fn check_all(
        &self,
        requests: Vec<WatchRequest>,
    ) -> Vec<(String, WatchResult<CheckOutcome>)> {
        let mut tasks = JoinSet::new();
        for request in requests {
            let runner = self.clone();
            tasks.spawn(async move {
                let result = runner.check(&request).await;
                (request.id, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, result)) => {
                    if let Err(e) = &result {
                        warn!(request_id = %id, error = %e, "Check not completed");
                    }
                    results.push((id, result));
                }
                Err(e) => error!(error = %e, "Check task panicked or was cancelled"),
            }
        }
        results
    }

    /// Checks every active watch request in the store.
    pub async fn check_all_active(&self) -> Vec<(String, WatchResult<CheckOutcome>)> {
        let requests = self.checker.store().active_requests().await;
        info!(count = requests.len(), "Checking active watch requests");
        self.check_all(requests).await
    }
}
