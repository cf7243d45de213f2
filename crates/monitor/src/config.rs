//! # Monitor Configuration
//!
//! Loads the settings for the check pipeline from environment variables,
//! providing defaults for everything so a local checkout runs with an empty
//! environment.
//!
//! ## Environment Variables
//!
//! - `TEEWATCH_DATA_FILE`: Path of the JSON store (default: "data/alerts.json")
//! - `AGENT_API_URL`: Endpoint the search and email agents are invoked through
//! - `AGENT_API_KEY`: API key sent as `x-api-key` (optional)
//! - `SEARCH_AGENT_ID`: Agent that searches for tee times
//! - `EMAIL_AGENT_ID`: Agent that sends alert emails
//! - `SCHEDULER_API_URL`: Base URL of the scheduler service
//! - `SCHEDULE_ID`: Schedule that triggers periodic checks
//! - `CAPABILITY_TIMEOUT_SECONDS`: Deadline for each agent call (default: 120)
//! - `MAX_CONCURRENT_CHECKS`: Check cycles allowed to run at once (default: 2)
//! - `LOG_LEVEL`: Logging level (default: "info")

use eyre::{Result, WrapErr, eyre};
use std::{env, path::PathBuf, time::Duration};
use tracing::Level;

pub const DEFAULT_SEARCH_AGENT_ID: &str = "6999248b317f68b98913d7dc";
pub const DEFAULT_EMAIL_AGENT_ID: &str = "699924a15d02b31774efd839";
pub const DEFAULT_SCHEDULE_ID: &str = "699924a0399dfadeac37dd32";

/// Configuration for the check pipeline and its external services.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// JSON document holding watch requests, notifications and preferences
    pub data_file: PathBuf,

    /// Endpoint used to invoke agents
    pub agent_api_url: String,

    /// API key for the agent endpoint (optional)
    pub agent_api_key: Option<String>,

    /// Agent that searches booking sites for tee times
    pub search_agent_id: String,

    /// Agent that composes and sends alert emails
    pub email_agent_id: String,

    /// Base URL of the scheduler service
    pub scheduler_api_url: String,

    /// Schedule that drives periodic checks
    pub schedule_id: String,

    /// Deadline applied to every agent call
    pub capability_timeout: Duration,

    /// Upper bound on concurrently running check cycles
    pub max_concurrent_checks: usize,

    /// Log level for the binaries
    pub log_level: Level,
}

impl MonitorConfig {
    /// Creates a new MonitorConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `CAPABILITY_TIMEOUT_SECONDS` is not a positive integer
    /// - `MAX_CONCURRENT_CHECKS` is not a positive integer
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`MonitorConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        // Storage settings
        let data_file = PathBuf::from(var("TEEWATCH_DATA_FILE", "data/alerts.json"));

        // Agent settings
        let agent_api_url = var("AGENT_API_URL", "http://localhost:3000/api/agent");
        let agent_api_key = lookup("AGENT_API_KEY").filter(|key| !key.trim().is_empty());
        let search_agent_id = var("SEARCH_AGENT_ID", DEFAULT_SEARCH_AGENT_ID);
        let email_agent_id = var("EMAIL_AGENT_ID", DEFAULT_EMAIL_AGENT_ID);

        // Scheduler settings
        let scheduler_api_url = var("SCHEDULER_API_URL", "http://localhost:3000/api/scheduler");
        let schedule_id = var("SCHEDULE_ID", DEFAULT_SCHEDULE_ID);

        // Performance settings
        let timeout_secs: u64 = var("CAPABILITY_TIMEOUT_SECONDS", "120")
            .parse()
            .wrap_err("Invalid CAPABILITY_TIMEOUT_SECONDS value")?;
        if timeout_secs == 0 {
            return Err(eyre!("CAPABILITY_TIMEOUT_SECONDS must be greater than zero"));
        }
        let max_concurrent_checks: usize = var("MAX_CONCURRENT_CHECKS", "2")
            .parse()
            .wrap_err("Invalid MAX_CONCURRENT_CHECKS value")?;
        if max_concurrent_checks == 0 {
            return Err(eyre!("MAX_CONCURRENT_CHECKS must be at least 1"));
        }

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        Ok(Self {
            data_file,
            agent_api_url,
            agent_api_key,
            search_agent_id,
            email_agent_id,
            scheduler_api_url,
            schedule_id,
            capability_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_checks,
            log_level,
        })
    }
}
