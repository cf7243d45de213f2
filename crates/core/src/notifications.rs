use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::extract;
use crate::models::{Notification, TeeTimeMatch, WatchRequest};

/// Builds one notification per match, in match order, with fresh ids.
///
/// The course name comes from the agent's payload when it reported one and
/// from the watch request otherwise. `email_sent` applies to the whole batch
/// because a check cycle sends a single digest email.
pub fn build_notifications(
    request: &WatchRequest,
    payload: &Value,
    matches: &[TeeTimeMatch],
    email_sent: bool,
    sent_at: DateTime<Utc>,
) -> Vec<Notification> {
    build_notifications_with(request, payload, matches, email_sent, sent_at, || {
        Uuid::new_v4().to_string()
    })
}

/// Same as [`build_notifications`] with a caller-supplied id source.
pub fn build_notifications_with(
    request: &WatchRequest,
    payload: &Value,
    matches: &[TeeTimeMatch],
    email_sent: bool,
    sent_at: DateTime<Utc>,
    mut next_id: impl FnMut() -> String,
) -> Vec<Notification> {
    let course_name = extract::course_name(payload).unwrap_or(&request.course_name);

    matches
        .iter()
        .map(|tee_time| Notification {
            id: next_id(),
            watch_request_id: request.id.clone(),
            course_name: course_name.to_string(),
            match_date: tee_time.date.clone(),
            match_time_slot: tee_time.time.clone(),
            available_spots: tee_time.available_spots.unwrap_or(0),
            booking_link: tee_time.booking_link.clone(),
            sent_at,
            email_sent,
        })
        .collect()
}
