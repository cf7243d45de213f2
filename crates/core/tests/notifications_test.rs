use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use teewatch_core::{
    models::{CheckFrequency, TeeTimeMatch, TimeWindow, WatchRequest, WatchStatus},
    notifications::{build_notifications, build_notifications_with},
};

fn request() -> WatchRequest {
    WatchRequest {
        id: "alert-7".to_string(),
        course_name: "Bethpage Black".to_string(),
        course_url: None,
        dates: vec![NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()],
        time_window: TimeWindow {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        },
        players: 2,
        notify_email: "golfer@example.com".to_string(),
        check_frequency: CheckFrequency::Thirty,
        status: WatchStatus::Active,
        created_at: Utc::now(),
    }
}

fn matches() -> Vec<TeeTimeMatch> {
    vec![
        TeeTimeMatch {
            date: "2025-07-15".to_string(),
            time: "6:10 AM".to_string(),
            available_spots: Some(2),
            price: "$150".to_string(),
            booking_link: "https://www.golfnow.com/1".to_string(),
        },
        TeeTimeMatch {
            date: "2025-07-15".to_string(),
            time: "8:50 AM".to_string(),
            ..TeeTimeMatch::default()
        },
    ]
}

#[test]
fn test_one_notification_per_match_in_order() {
    let sent_at = Utc.with_ymd_and_hms(2025, 7, 14, 18, 0, 0).unwrap();
    let mut counter = 0;

    let notifications = build_notifications_with(
        &request(),
        &Value::Null,
        &matches(),
        true,
        sent_at,
        || {
            counter += 1;
            format!("n{}", counter)
        },
    );

    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].id, "n1");
    assert_eq!(notifications[1].id, "n2");
    assert_eq!(notifications[0].match_time_slot, "6:10 AM");
    assert_eq!(notifications[1].match_time_slot, "8:50 AM");
    assert_eq!(notifications[1].available_spots, 0);
    assert_eq!(notifications[1].booking_link, "");
    for notification in &notifications {
        assert_eq!(notification.watch_request_id, "alert-7");
        assert_eq!(notification.course_name, "Bethpage Black");
        assert_eq!(notification.sent_at, sent_at);
        assert!(notification.email_sent);
    }
}

#[test]
fn test_course_name_from_payload_wins() {
    let payload = json!({"course_name": "Bethpage State Park - Black Course"});

    let notifications = build_notifications(&request(), &payload, &matches(), false, Utc::now());

    assert!(notifications.iter().all(|n| n.course_name == "Bethpage State Park - Black Course"));
    assert!(notifications.iter().all(|n| !n.email_sent));
    assert_ne!(notifications[0].id, notifications[1].id);
}

#[test]
fn test_no_matches_no_notifications() {
    let notifications = build_notifications(&request(), &Value::Null, &[], true, Utc::now());

    assert!(notifications.is_empty());
}
