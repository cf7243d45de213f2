//! Invocation of remote agents over HTTP.
//!
//! Both the search agent and the email agent sit behind one endpoint that
//! takes a natural-language `message` plus an `agent_id` and replies with a
//! JSON envelope. Only the envelope's `success` and `error` fields have a
//! fixed meaning; the rest is interpreted by [`teewatch_core::extract`].

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Reply of one agent invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    pub success: bool,
    pub error: Option<String>,
    /// The full reply envelope.
    pub body: Value,
}

impl AgentResponse {
    /// Reads `success` and `error` from an envelope. `assumed_success` is used
    /// when the envelope does not say.
    pub fn from_body(body: Value, assumed_success: bool) -> Self {
        let success = body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(assumed_success);
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            success,
            error,
            body,
        }
    }

    /// Successful reply carrying `response` in the usual envelope.
    pub fn ok(response: Value) -> Self {
        Self::from_body(json!({ "success": true, "response": response }), true)
    }

    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::from_body(json!({ "success": false, "error": error }), false)
    }

    /// Free-text explanation the agent attached to its reply, if any.
    pub fn agent_message(&self) -> Option<&str> {
        non_blank(self.body.pointer("/response/message"))
            .or_else(|| non_blank(self.body.get("raw_response")))
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// Sends an instruction to an agent and returns its reply.
///
/// Transport failures are errors. A reply with `success = false` is not.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentResponse>;
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    message: &'a str,
    agent_id: &'a str,
}

/// [`AgentCapability`] backed by the agent HTTP endpoint.
#[derive(Clone)]
pub struct HttpAgentClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpAgentClient {
    /// `timeout` bounds the whole request, including reading the reply.
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build agent HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl AgentCapability for HttpAgentClient {
    async fn invoke(&self, prompt: &str, agent_id: &str) -> Result<AgentResponse> {
        debug!(agent_id, url = %self.url, "Invoking agent");

        let mut request = self.http.post(&self.url).json(&AgentRequest {
            message: prompt,
            agent_id,
        });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .wrap_err_with(|| format!("Agent request to {} failed", self.url))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .wrap_err("Failed to read agent response")?;

        // Agents occasionally answer with plain text instead of JSON.
        let body = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| json!({ "raw_response": text }));

        let mut reply = AgentResponse::from_body(body, status.is_success());
        if !status.is_success() {
            warn!(agent_id, %status, "Agent endpoint returned an error status");
            reply.success = false;
            if reply.error.is_none() {
                reply.error = Some(format!("Agent endpoint returned {}", status));
            }
        }

        Ok(reply)
    }
}
