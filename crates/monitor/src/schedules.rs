//! Control of the external scheduler that triggers periodic checks.
//!
//! The scheduler replies to every call with an envelope of the form
//! `{ success, error?, schedules?, executions? }`. A reply with
//! `success = false` becomes [`WatchError::Capability`] carrying the
//! scheduler's message.

use std::time::Duration;

use async_trait::async_trait;
use eyre::WrapErr;
use serde::Deserialize;
use teewatch_core::{
    errors::{WatchError, WatchResult},
    models::{ExecutionLog, Schedule},
};
use tracing::{debug, info, warn};

/// Number of execution log entries shown by default.
pub const DEFAULT_LOG_LIMIT: usize = 10;

#[async_trait]
pub trait ScheduleProxy: Send + Sync {
    async fn list(&self) -> WatchResult<Vec<Schedule>>;

    /// Most recent executions first, at most `limit` of them.
    async fn logs(&self, schedule_id: &str, limit: usize) -> WatchResult<Vec<ExecutionLog>>;

    async fn pause(&self, schedule_id: &str) -> WatchResult<()>;

    async fn resume(&self, schedule_id: &str) -> WatchResult<()>;

    async fn trigger_now(&self, schedule_id: &str) -> WatchResult<()>;
}

/// The configured schedule if the scheduler knows it, else the first one.
pub fn pick_schedule<'a>(schedules: &'a [Schedule], preferred_id: &str) -> Option<&'a Schedule> {
    schedules
        .iter()
        .find(|schedule| schedule.id == preferred_id)
        .or_else(|| schedules.first())
}

/// The check schedule together with its recent executions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOverview {
    pub schedule: Option<Schedule>,
    pub logs: Vec<ExecutionLog>,
}

/// Loads the schedule list and the execution logs of `schedule_id`.
///
/// A failure to load the logs is logged and yields an empty log list.
pub async fn schedule_overview(
    proxy: &dyn ScheduleProxy,
    schedule_id: &str,
    limit: usize,
) -> WatchResult<ScheduleOverview> {
    let schedules = proxy.list().await?;
    let schedule = pick_schedule(&schedules, schedule_id).cloned();

    let logs = match proxy.logs(schedule_id, limit).await {
        Ok(logs) => logs,
        Err(e) => {
            warn!(schedule_id, error = %e, "Failed to load schedule logs");
            Vec::new()
        }
    };

    Ok(ScheduleOverview { schedule, logs })
}

#[derive(Debug, Default, Deserialize)]
struct SchedulerReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    schedules: Vec<Schedule>,
    #[serde(default)]
    executions: Vec<ExecutionLog>,
}

impl SchedulerReply {
    fn into_result(self, action: &str) -> WatchResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(WatchError::Capability(
                self.error
                    .clone()
                    .unwrap_or_else(|| format!("Failed to {}", action)),
            ))
        }
    }
}

/// [`ScheduleProxy`] backed by the scheduler's HTTP API.
#[derive(Clone)]
pub struct HttpScheduleClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpScheduleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build scheduler HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> WatchResult<SchedulerReply> {
        let response = request
            .send()
            .await
            .map_err(|e| WatchError::Capability(format!("Failed to {}: {}", action, e)))?;

        let reply = response
            .json::<SchedulerReply>()
            .await
            .map_err(|e| WatchError::Capability(format!("Unreadable scheduler reply: {}", e)))?;

        reply.into_result(action)
    }
}

#[async_trait]
impl ScheduleProxy for HttpScheduleClient {
    async fn list(&self) -> WatchResult<Vec<Schedule>> {
        let reply = self
            .send(self.http.get(self.url("schedules")), "load schedules")
            .await?;
        debug!(count = reply.schedules.len(), "Loaded schedules");
        Ok(reply.schedules)
    }

    async fn logs(&self, schedule_id: &str, limit: usize) -> WatchResult<Vec<ExecutionLog>> {
        let request = self
            .http
            .get(self.url(&format!("schedules/{}/logs", schedule_id)))
            .query(&[("limit", limit)]);
        let mut executions = self.send(request, "load schedule logs").await?.executions;
        executions.truncate(limit);
        Ok(executions)
    }

    async fn pause(&self, schedule_id: &str) -> WatchResult<()> {
        let request = self.http.post(self.url(&format!("schedules/{}/pause", schedule_id)));
        self.send(request, "pause schedule").await?;
        info!(schedule_id, "Schedule paused");
        Ok(())
    }

    async fn resume(&self, schedule_id: &str) -> WatchResult<()> {
        let request = self.http.post(self.url(&format!("schedules/{}/resume", schedule_id)));
        self.send(request, "resume schedule").await?;
        info!(schedule_id, "Schedule resumed");
        Ok(())
    }

    async fn trigger_now(&self, schedule_id: &str) -> WatchResult<()> {
        let request = self.http.post(self.url(&format!("schedules/{}/trigger", schedule_id)));
        self.send(request, "trigger schedule").await?;
        info!(schedule_id, "Schedule triggered");
        Ok(())
    }
}
