//! Natural-language instructions for the search and email agents.
//!
//! The search agent matches loosely, so every date is given twice: once in
//! long form (`Tuesday, July 15, 2025`) and once as `YYYY-MM-DD`.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{TeeTimeMatch, WatchRequest};

/// Booking site searched by the agent and linked when a match has no link.
pub const BOOKING_SITE: &str = "https://www.golfnow.com";

/// How many matches besides the first one are listed in the alert email.
pub const DIGEST_EXTRA_MATCHES: usize = 4;

pub fn human_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn human_dates(request: &WatchRequest) -> String {
    request
        .dates
        .iter()
        .map(|date| human_date(*date))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn raw_dates(request: &WatchRequest) -> String {
    request
        .dates
        .iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn search_prompt(request: &WatchRequest) -> String {
    let human = human_dates(request);
    let raw = raw_dates(request);
    let course = &request.course_name;

    format!(
        r#"Search the web RIGHT NOW for available tee times. This is a real search request.

SEARCH FOR: "{course}" tee times on GolfNow.com
DATES TO CHECK: {human} ({raw})
PREFERRED TIME WINDOW: {start} to {end}
NUMBER OF PLAYERS: {players}

INSTRUCTIONS:
1. Search GolfNow.com for "{course}" tee times on {human}
2. Also search for "{course} tee times {raw}"
3. List EVERY available tee time you find with the exact time, price, and booking URL
4. Set matches_found to true if you find ANY tee times at all
5. Include ALL tee times, not just those in the preferred window
6. Use real GolfNow booking URLs
7. If price is visible, include it. Otherwise use "See GolfNow"

Return the results as JSON with the matching_tee_times array populated. Each entry needs date, time, available_spots, price and booking_link."#,
        start = display_time(request.time_window.start),
        end = display_time(request.time_window.end),
        players = request.players,
    )
}

pub fn alert_subject(request: &WatchRequest, first: &TeeTimeMatch) -> String {
    let date = if first.date.is_empty() {
        raw_dates(request)
    } else {
        first.date.clone()
    };
    format!("Tee Time Available - {} on {}", request.course_name, date)
}

/// Email instruction summarizing the first match plus up to
/// [`DIGEST_EXTRA_MATCHES`] more. Returns `None` when there is nothing to send.
pub fn alert_email_prompt(request: &WatchRequest, matches: &[TeeTimeMatch]) -> Option<String> {
    let (first, rest) = matches.split_first()?;

    let date = if first.date.is_empty() {
        raw_dates(request)
    } else {
        first.date.clone()
    };
    let slot = if first.time.is_empty() {
        "Available"
    } else {
        first.time.as_str()
    };
    let link = if first.booking_link.is_empty() {
        request.course_url.as_deref().unwrap_or(BOOKING_SITE)
    } else {
        first.booking_link.as_str()
    };

    let additional = rest
        .iter()
        .take(DIGEST_EXTRA_MATCHES)
        .map(|tee_time| format!("{} ({})", tee_time.time, tee_time.price))
        .collect::<Vec<_>>();
    let additional = if additional.is_empty() {
        "None".to_string()
    } else {
        additional.join(", ")
    };

    Some(format!(
        "Send a tee time alert email with the following details:
Recipient Email: {recipient}
Email Subject: {subject}
Course Name: {course}
Tee Time Date: {date}
Tee Time Slot: {slot}
Available Spots: {spots}
Price: {price}
Booking Link: {link}

Additional tee times found: {additional}

Please compose a professional email with all these details and a prominent booking link.",
        recipient = request.notify_email,
        subject = alert_subject(request, first),
        course = request.course_name,
        spots = first
            .available_spots
            .unwrap_or_else(|| u32::from(request.players)),
        price = first.price,
    ))
}
