#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::{Value, json};
use teewatch_core::models::{
    CheckFrequency, CheckPhase, StatusEvent, TimeWindow, WatchRequest, WatchStatus,
};
use teewatch_monitor::{checker::AgentIds, status::StatusSink};

pub const SEARCH_AGENT: &str = "search-agent";
pub const EMAIL_AGENT: &str = "email-agent";

pub fn agent_ids() -> AgentIds {
    AgentIds {
        search: SEARCH_AGENT.to_string(),
        email: EMAIL_AGENT.to_string(),
    }
}

pub fn watch_request(id: &str) -> WatchRequest {
    WatchRequest {
        id: id.to_string(),
        course_name: "Torrey Pines South".to_string(),
        course_url: None,
        dates: vec![
            NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 16).unwrap(),
        ],
        time_window: TimeWindow {
            start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        },
        players: 2,
        notify_email: "golfer@example.com".to_string(),
        check_frequency: CheckFrequency::Thirty,
        status: WatchStatus::Active,
        created_at: Utc::now(),
    }
}

/// Search result in the `response.result` shape with `count` tee times.
pub fn search_result(count: usize) -> Value {
    let tee_times: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "date": "2025-07-15",
                "time": format!("{}:10 AM", 7 + i),
                "available_spots": 2,
                "price": "$95",
                "booking_link": format!("https://www.golfnow.com/tee-times/{}", i),
            })
        })
        .collect();

    json!({
        "result": {
            "course_name": "Torrey Pines (South)",
            "matches_found": count > 0,
            "total_matches": count,
            "matching_tee_times": tee_times,
        }
    })
}

/// Status sink that keeps every event it receives.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<StatusEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<CheckPhase> {
        self.events().iter().map(|event| event.phase).collect()
    }

    pub fn last(&self) -> StatusEvent {
        self.events().last().cloned().expect("no status published")
    }
}

impl StatusSink for Recorder {
    fn publish(&self, event: StatusEvent) {
        self.events.lock().unwrap().push(event);
    }
}
