mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{EMAIL_AGENT, Recorder, SEARCH_AGENT, agent_ids, search_result, watch_request};
use pretty_assertions::assert_eq;
use serde_json::json;
use teewatch_core::models::{CheckPhase, Delivery, Preferences, StatusKind};
use teewatch_monitor::{
    agent::{AgentCapability, AgentResponse},
    checker::Checker,
    mock::MockAgent,
};
use teewatch_store::{JsonFileStore, WatchStore, mock::MockStore};

const TIMEOUT: Duration = Duration::from_secs(5);

fn checker(agent: MockAgent, store: MockStore, recorder: Arc<Recorder>) -> Checker {
    Checker::new(Arc::new(agent), Arc::new(store), recorder, agent_ids(), TIMEOUT)
}

fn email_enabled(enabled: bool) -> Preferences {
    Preferences {
        email_notifications_enabled: enabled,
        ..Preferences::default()
    }
}

#[test_log::test(tokio::test)]
async fn test_matches_are_notified_and_recorded() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == SEARCH_AGENT)
        .times(1)
        .returning(|_, _| Ok(AgentResponse::ok(search_result(3))));
    agent
        .expect_invoke()
        .withf(|prompt, agent_id| {
            agent_id.to_string() == EMAIL_AGENT && prompt.contains("Recipient Email: golfer@example.com")
        })
        .times(1)
        .returning(|_, _| Ok(AgentResponse::ok(json!({ "message": "sent" }))));

    let mut store = MockStore::new();
    store
        .expect_preferences()
        .times(1)
        .returning(|| email_enabled(true));
    store
        .expect_append_notifications()
        .withf(|batch| batch.len() == 3 && batch.iter().all(|n| n.email_sent))
        .times(1)
        .returning(|batch| batch.len());

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder.clone())
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.phase(), CheckPhase::Done);
    assert_eq!(outcome.status.kind, StatusKind::Success);
    assert_eq!(outcome.delivery, Some(Delivery::Sent));
    assert_eq!(outcome.matches.len(), 3);
    assert_eq!(outcome.recorded.len(), 3);
    assert!(outcome.recorded.iter().all(|n| n.watch_request_id == "a1"));
    assert!(outcome.recorded.iter().all(|n| n.course_name == "Torrey Pines (South)"));
    assert_eq!(
        outcome.status.message,
        "3 tee times found and email alert sent to golfer@example.com!"
    );
    assert_eq!(
        recorder.phases(),
        vec![
            CheckPhase::Searching,
            CheckPhase::Extracting,
            CheckPhase::MatchFound,
            CheckPhase::Notifying,
            CheckPhase::Recording,
            CheckPhase::Done,
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_match_found_status_precedes_notification() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == SEARCH_AGENT)
        .returning(|_, _| Ok(AgentResponse::ok(search_result(1))));
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == EMAIL_AGENT)
        .returning(|_, _| Ok(AgentResponse::ok(json!({}))));

    let mut store = MockStore::new();
    store.expect_preferences().returning(|| email_enabled(true));
    store.expect_append_notifications().returning(|batch| batch.len());

    let recorder = Arc::new(Recorder::default());
    checker(agent, store, recorder.clone())
        .check_one(&watch_request("a1"))
        .await;

    let found = recorder
        .events()
        .into_iter()
        .find(|event| event.phase == CheckPhase::MatchFound)
        .unwrap();
    assert_eq!(found.kind, StatusKind::Success);
    assert_eq!(found.message, "Found 1 available tee time! Sending email alert...");
}

#[test_log::test(tokio::test)]
async fn test_search_failure_writes_nothing() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .times(1)
        .returning(|_, _| Ok(AgentResponse::failed("upstream unavailable")));

    let mut store = MockStore::new();
    store.expect_preferences().never();
    store.expect_append_notifications().never();

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder.clone())
        .check_one(&watch_request("a1"))
        .await;

    assert!(outcome.is_error());
    assert_eq!(outcome.status.kind, StatusKind::Error);
    assert_eq!(outcome.status.message, "Agent error: upstream unavailable");
    assert!(outcome.recorded.is_empty());
    assert_eq!(outcome.delivery, None);
    assert_eq!(recorder.phases(), vec![CheckPhase::Searching, CheckPhase::Errored]);
}

#[test_log::test(tokio::test)]
async fn test_transport_error_is_a_capability_failure() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .returning(|_, _| Err(eyre::eyre!("connection refused")));

    let mut store = MockStore::new();
    store.expect_append_notifications().never();

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder)
        .check_one(&watch_request("a1"))
        .await;

    assert!(outcome.is_error());
    assert!(outcome.status.message.contains("connection refused"));
}

#[test_log::test(tokio::test)]
async fn test_email_disabled_records_without_sending() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == SEARCH_AGENT)
        .times(1)
        .returning(|_, _| Ok(AgentResponse::ok(search_result(2))));
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == EMAIL_AGENT)
        .never();

    let mut store = MockStore::new();
    store.expect_preferences().returning(|| email_enabled(false));
    store
        .expect_append_notifications()
        .withf(|batch| batch.len() == 2 && batch.iter().all(|n| !n.email_sent))
        .times(1)
        .returning(|batch| batch.len());

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder.clone())
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.delivery, Some(Delivery::Skipped));
    assert_eq!(
        outcome.status.message,
        "2 tee times found! Email notifications are disabled in Settings."
    );
    assert_eq!(
        recorder.phases(),
        vec![
            CheckPhase::Searching,
            CheckPhase::Extracting,
            CheckPhase::MatchFound,
            CheckPhase::Recording,
            CheckPhase::Done,
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_failed_email_still_records_matches() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == SEARCH_AGENT)
        .returning(|_, _| Ok(AgentResponse::ok(search_result(2))));
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == EMAIL_AGENT)
        .returning(|_, _| Ok(AgentResponse::failed("mailbox full")));

    let mut store = MockStore::new();
    store.expect_preferences().returning(|| email_enabled(true));
    store
        .expect_append_notifications()
        .withf(|batch| batch.len() == 2 && batch.iter().all(|n| !n.email_sent))
        .times(1)
        .returning(|batch| batch.len());

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder)
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.phase(), CheckPhase::Done);
    assert_eq!(outcome.status.kind, StatusKind::Success);
    assert_eq!(outcome.delivery, Some(Delivery::Failed("mailbox full".to_string())));
    assert_eq!(outcome.status.message, "2 tee times found. Email delivery: mailbox full");
    assert_eq!(outcome.recorded.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_no_match_reports_agent_message() {
    let mut agent = MockAgent::new();
    agent.expect_invoke().times(1).returning(|_, _| {
        Ok(AgentResponse::ok(json!({
            "message": "The course is fully booked on both days.",
            "result": { "course_name": "Torrey Pines", "matches_found": false, "matching_tee_times": [] }
        })))
    });

    let mut store = MockStore::new();
    store.expect_preferences().never();
    store.expect_append_notifications().never();

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, store, recorder.clone())
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.phase(), CheckPhase::Done);
    assert_eq!(outcome.status.kind, StatusKind::Info);
    assert!(outcome.matches.is_empty());
    assert!(
        outcome
            .status
            .message
            .starts_with("No tee times found for Torrey Pines on 2025-07-15, 2025-07-16.")
    );
    assert!(
        outcome
            .status
            .message
            .ends_with("Agent message: The course is fully booked on both days.")
    );
    assert_eq!(
        recorder.phases(),
        vec![
            CheckPhase::Searching,
            CheckPhase::Extracting,
            CheckPhase::NoMatch,
            CheckPhase::Done,
        ]
    );
    let events = recorder.events();
    assert_eq!(events[2].message, outcome.status.message);
}

#[test_log::test(tokio::test)]
async fn test_no_match_without_message_previews_payload() {
    let mut agent = MockAgent::new();
    agent.expect_invoke().returning(|_, _| {
        Ok(AgentResponse::ok(json!({ "notes": "x".repeat(500) })))
    });

    let recorder = Arc::new(Recorder::default());
    let outcome = checker(agent, MockStore::new(), recorder)
        .check_one(&watch_request("a1"))
        .await;

    let (_, preview) = outcome.status.message.split_once(" Response preview: ").unwrap();
    assert_eq!(preview.chars().count(), 200);
    // Falls back to the request's course when the agent named none.
    assert!(outcome.status.message.contains("Torrey Pines South"));
}

#[test_log::test(tokio::test)]
async fn test_found_flag_without_matches_is_no_match() {
    let mut agent = MockAgent::new();
    agent.expect_invoke().returning(|_, _| {
        Ok(AgentResponse::ok(json!({ "result": { "matches_found": true, "matching_tee_times": [] } })))
    });

    let mut store = MockStore::new();
    store.expect_append_notifications().never();

    let outcome = checker(agent, store, Arc::new(Recorder::default()))
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.status.kind, StatusKind::Info);
    assert!(outcome.recorded.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_malformed_response_degrades_to_no_match() {
    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .returning(|_, _| Ok(AgentResponse::ok(json!("I could not parse the booking site"))));

    let outcome = checker(agent, MockStore::new(), Arc::new(Recorder::default()))
        .check_one(&watch_request("a1"))
        .await;

    assert_eq!(outcome.phase(), CheckPhase::Done);
    assert_eq!(outcome.status.kind, StatusKind::Info);
}

struct StalledAgent;

#[async_trait]
impl AgentCapability for StalledAgent {
    async fn invoke(&self, _prompt: &str, _agent_id: &str) -> eyre::Result<AgentResponse> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(AgentResponse::ok(search_result(1)))
    }
}

#[test_log::test(tokio::test)]
async fn test_search_deadline_expiry_is_an_error() {
    let mut store = MockStore::new();
    store.expect_append_notifications().never();

    let recorder = Arc::new(Recorder::default());
    let checker = Checker::new(
        Arc::new(StalledAgent),
        Arc::new(store),
        recorder.clone(),
        agent_ids(),
        Duration::from_millis(50),
    );

    let outcome = checker.check_one(&watch_request("a1")).await;

    assert!(outcome.is_error());
    assert!(outcome.status.message.starts_with("Agent error: no response within"));
    assert_eq!(recorder.last().phase, CheckPhase::Errored);
}

#[test_log::test(tokio::test)]
async fn test_cycle_against_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("alerts.json")));
    let request = store.upsert_request(watch_request("a1")).await;

    let mut agent = MockAgent::new();
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == SEARCH_AGENT)
        .returning(|_, _| Ok(AgentResponse::ok(search_result(2))));
    agent
        .expect_invoke()
        .withf(|_, agent_id| agent_id.to_string() == EMAIL_AGENT)
        .returning(|_, _| Ok(AgentResponse::ok(json!({}))));

    let checker = Checker::new(
        Arc::new(agent),
        store.clone(),
        Arc::new(Recorder::default()),
        agent_ids(),
        TIMEOUT,
    );
    checker.check_one(&request).await;

    let document = store.load_all().await;
    assert_eq!(document.notifications.len(), 2);
    assert_eq!(document.notifications[0].match_time_slot, "7:10 AM");
    assert_eq!(document.notifications[1].match_time_slot, "8:10 AM");
    // A check never changes the request itself.
    assert_eq!(document.alerts, vec![request]);
}
