//! # TeeWatch Monitor
//!
//! The check pipeline: invokes the search agent for a watch request, reads
//! the matches out of its reply, sends the alert email and records the
//! resulting notifications.
//!
//! ## Modules
//!
//! - `agent`: Agent invocation over HTTP
//! - `checker`: The per-request check cycle
//! - `runner`: In-flight guard and bounded fan-out across requests
//! - `schedules`: Control of the external check schedule
//! - `status`: Per-request progress reporting
//! - `config`: Environment configuration

use std::sync::Arc;

use eyre::Result;
use teewatch_store::WatchStore;
use tracing::info;

pub mod agent;
pub mod checker;
pub mod config;
pub mod mock;
pub mod runner;
pub mod schedules;
pub mod status;

use agent::HttpAgentClient;
use checker::{AgentIds, Checker};
use config::MonitorConfig;
use runner::CheckRunner;
use schedules::HttpScheduleClient;
use status::StatusSink;

/// Wires the HTTP agent client, the store and `status` into a runner.
pub fn build_runner(
    config: &MonitorConfig,
    store: Arc<dyn WatchStore>,
    status: Arc<dyn StatusSink>,
) -> Result<CheckRunner> {
    info!(
        agent_api = %config.agent_api_url,
        max_concurrent = config.max_concurrent_checks,
        "Building check runner"
    );

    // Must exceed the per-call deadline enforced by the checker.
    let agent = HttpAgentClient::new(
        config.agent_api_url.clone(),
        config.agent_api_key.clone(),
        config.capability_timeout + std::time::Duration::from_secs(5),
    )?;

    let checker = Checker::new(
        Arc::new(agent),
        store,
        status,
        AgentIds {
            search: config.search_agent_id.clone(),
            email: config.email_agent_id.clone(),
        },
        config.capability_timeout,
    );

    Ok(CheckRunner::new(Arc::new(checker), config.max_concurrent_checks))
}

pub fn build_schedule_client(config: &MonitorConfig) -> Result<HttpScheduleClient> {
    HttpScheduleClient::new(config.scheduler_api_url.clone(), config.capability_timeout)
}
