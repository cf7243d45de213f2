#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Utc};
use teewatch_core::models::{
    CheckFrequency, Notification, TimeWindow, WatchRequest, WatchStatus,
};

pub fn watch_request(id: &str) -> WatchRequest {
    WatchRequest {
        id: id.to_string(),
        course_name: "Pebble Beach Golf Links".to_string(),
        course_url: None,
        dates: vec![NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()],
        time_window: TimeWindow {
            start: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        },
        players: 4,
        notify_email: "golfer@example.com".to_string(),
        check_frequency: CheckFrequency::Fifteen,
        status: WatchStatus::Active,
        created_at: Utc::now(),
    }
}

pub fn notification(id: &str) -> Notification {
    Notification {
        id: id.to_string(),
        watch_request_id: "a1".to_string(),
        course_name: "Pebble Beach Golf Links".to_string(),
        match_date: "2025-07-15".to_string(),
        match_time_slot: "7:10 AM".to_string(),
        available_spots: 4,
        booking_link: String::new(),
        sent_at: Utc::now(),
        email_sent: true,
    }
}

pub fn batch(prefix: &str, count: usize) -> Vec<Notification> {
    (0..count)
        .map(|i| notification(&format!("{}-{}", prefix, i)))
        .collect()
}
