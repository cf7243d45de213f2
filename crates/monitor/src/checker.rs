//! # Check Cycle
//!
//! One check cycle runs a single watch request through
//! `Searching -> Extracting -> (NoMatch | MatchFound) -> Notifying -> Recording -> Done`,
//! with `Errored` reachable when the search call fails. Every phase change is
//! published to a [`StatusSink`].
//!
//! A cycle never retries. Transient failures are absorbed by the next periodic
//! run. The watch request itself is never modified by a check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use teewatch_core::{
    errors::{WatchError, WatchResult},
    extract::{Extraction, Extractor},
    models::{CheckPhase, Delivery, Notification, StatusEvent, TeeTimeMatch, WatchRequest},
    notifications::build_notifications,
    prompts::{alert_email_prompt, raw_dates, search_prompt},
};
use teewatch_store::WatchStore;
use tracing::{debug, info, warn};

use crate::agent::{AgentCapability, AgentResponse};
use crate::status::StatusSink;

const AGENT_MESSAGE_EXCERPT: usize = 150;
const PAYLOAD_PREVIEW: usize = 200;

/// Agents used by a check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIds {
    pub search: String,
    pub email: String,
}

/// Result of one check cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// The last status event published by the cycle.
    pub status: StatusEvent,
    pub matches: Vec<TeeTimeMatch>,
    /// Notifications written to the store.
    pub recorded: Vec<Notification>,
    /// `None` unless the cycle found matches.
    pub delivery: Option<Delivery>,
}

impl CheckOutcome {
    fn finished(status: StatusEvent) -> Self {
        Self {
            status,
            matches: Vec::new(),
            recorded: Vec::new(),
            delivery: None,
        }
    }

    pub fn phase(&self) -> CheckPhase {
        self.status.phase
    }

    pub fn is_error(&self) -> bool {
        self.status.phase == CheckPhase::Errored
    }
}

/// Drives check cycles against the agent capability and the store.
pub struct Checker {
    agent: Arc<dyn AgentCapability>,
    store: Arc<dyn WatchStore>,
    status: Arc<dyn StatusSink>,
    agents: AgentIds,
    call_timeout: Duration,
    extractor: Extractor,
}

impl Checker {
    pub fn new(
        agent: Arc<dyn AgentCapability>,
        store: Arc<dyn WatchStore>,
        status: Arc<dyn StatusSink>,
        agents: AgentIds,
        call_timeout: Duration,
    ) -> Self {
        Self {
            agent,
            store,
            status,
            agents,
            call_timeout,
            extractor: Extractor::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn WatchStore> {
        &self.store
    }

    /// Runs one full check cycle for `request`.
    ///
    /// Failures of the search call end the cycle in `Errored` without touching
    /// the store. A failed alert email does not: the matches are still recorded
    /// with `emailSent = false`.
    pub async fn check_one(&self, request: &WatchRequest) -> CheckOutcome {
        let id = request.id.as_str();
        info!(request_id = %id, course = %request.course_name, "Starting check cycle");

        // Searching
        self.publish(StatusEvent::info(
            id,
            CheckPhase::Searching,
            format!("Searching for available tee times at {}...", request.course_name),
        ));

        let response = match self.call(&self.agents.search, &search_prompt(request)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(request_id = %id, error = %e, "Search failed");
                let status = StatusEvent::error(
                    id,
                    CheckPhase::Errored,
                    format!("Agent error: {}", reason(&e)),
                );
                self.publish(status.clone());
                return CheckOutcome::finished(status);
            }
        };

        // Extracting
        self.publish(StatusEvent::info(
            id,
            CheckPhase::Extracting,
            "Reading search results...",
        ));
        let extraction = self.extractor.extract(&response.body);
        debug!(
            request_id = %id,
            found = extraction.found,
            matches = extraction.matches.len(),
            source = extraction.source.unwrap_or("none"),
            "Extracted search response"
        );

        if !extraction.found || extraction.matches.is_empty() {
            info!(request_id = %id, "No tee times found");
            let message = no_match_message(request, &response, &extraction);
            self.publish(StatusEvent::info(id, CheckPhase::NoMatch, message.clone()));

            let status = StatusEvent::info(id, CheckPhase::Done, message);
            self.publish(status.clone());
            return CheckOutcome::finished(status);
        }

        // MatchFound
        let count = extraction.matches.len();
        let email_enabled = self.store.preferences().await.email_notifications_enabled;
        let found = format!("Found {} available {}!", count, tee_times(count));
        self.publish(StatusEvent::success(
            id,
            CheckPhase::MatchFound,
            if email_enabled {
                format!("{} Sending email alert...", found)
            } else {
                found
            },
        ));

        // Notifying
        let delivery = if email_enabled {
            self.notify(request, &extraction.matches).await
        } else {
            debug!(request_id = %id, "Email notifications disabled, skipping alert");
            Delivery::Skipped
        };

        // Recording
        self.publish(StatusEvent::info(
            id,
            CheckPhase::Recording,
            format!("Saving {} to history...", tee_times(count)),
        ));
        let recorded = build_notifications(
            request,
            &extraction.payload,
            &extraction.matches,
            delivery.email_sent(),
            Utc::now(),
        );
        let retained = self.store.append_notifications(recorded.clone()).await;
        debug!(
            request_id = %id,
            recorded = recorded.len(),
            retained,
            "Recorded notifications"
        );

        // Done
        let summary = format!("{} {}", count, tee_times(count));
        let message = match &delivery {
            Delivery::Sent => format!(
                "{} found and email alert sent to {}!",
                summary, request.notify_email
            ),
            Delivery::Failed(error) => {
                format!("{} found. Email delivery: {}", summary, error)
            }
            Delivery::Skipped => format!(
                "{} found! Email notifications are disabled in Settings.",
                summary
            ),
        };
        info!(request_id = %id, matches = count, ?delivery, "Check cycle finished");

        let status = StatusEvent::success(id, CheckPhase::Done, message);
        self.publish(status.clone());

        CheckOutcome {
            status,
            matches: extraction.matches,
            recorded,
            delivery: Some(delivery),
        }
    }

    async fn notify(&self, request: &WatchRequest, matches: &[TeeTimeMatch]) -> Delivery {
        let Some(prompt) = alert_email_prompt(request, matches) else {
            return Delivery::Skipped;
        };

        self.publish(StatusEvent::info(
            &request.id,
            CheckPhase::Notifying,
            format!("Sending email alert to {}...", request.notify_email),
        ));

        match self.call(&self.agents.email, &prompt).await {
            Ok(_) => Delivery::Sent,
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "Alert email failed");
                Delivery::Failed(reason(&e))
            }
        }
    }

    /// Invokes an agent under the call deadline. Transport errors, expired
    /// deadlines and unsuccessful replies all become `Capability` errors.
    async fn call(&self, agent_id: &str, prompt: &str) -> WatchResult<AgentResponse> {
        let invocation = self.agent.invoke(prompt, agent_id);
        let reply = tokio::time::timeout(self.call_timeout, invocation)
            .await
            .map_err(|_| {
                WatchError::Capability(format!(
                    "no response within {} seconds",
                    self.call_timeout.as_secs()
                ))
            })?
            .map_err(|e| WatchError::Capability(format!("{:#}", e)))?;

        if reply.success {
            Ok(reply)
        } else {
            Err(WatchError::Capability(
                reply
                    .error
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }

    fn publish(&self, event: StatusEvent) {
        self.status.publish(event);
    }
}

fn reason(error: &WatchError) -> String {
    match error {
        WatchError::Capability(message) => message.clone(),
        other => other.to_string(),
    }
}

fn tee_times(count: usize) -> &'static str {
    if count == 1 { "tee time" } else { "tee times" }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn no_match_message(
    request: &WatchRequest,
    response: &AgentResponse,
    extraction: &Extraction,
) -> String {
    let course = extraction.course_name().unwrap_or(&request.course_name);

    let hint = match response.agent_message() {
        Some(message) => format!(
            " Agent message: {}",
            excerpt(message, AGENT_MESSAGE_EXCERPT)
        ),
        None if !extraction.payload.is_null() => format!(
            " Response preview: {}",
            excerpt(&extraction.payload.to_string(), PAYLOAD_PREVIEW)
        ),
        None => String::new(),
    };

    format!(
        "No tee times found for {} on {}. The agent searched but found no availability. \
         Try a different date or broaden the time window.{}",
        course,
        raw_dates(request),
        hint
    )
}
