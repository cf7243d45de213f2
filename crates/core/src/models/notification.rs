use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of one matched tee time. Created once per match by a check
/// cycle and never mutated afterwards.
///
/// Older documents stored whatever the agent returned for the match fields,
/// so those are read leniently: numbers and numeric strings are both
/// accepted, and anything else falls back to the empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// May point at a watch request that has since been deleted.
    #[serde(rename = "alertId")]
    pub watch_request_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub course_name: String,
    #[serde(rename = "teeTimeDate", default, deserialize_with = "lenient::text")]
    pub match_date: String,
    #[serde(rename = "teeTimeSlot", default, deserialize_with = "lenient::text")]
    pub match_time_slot: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub available_spots: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub booking_link: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub email_sent: bool,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::extract::{as_count, as_text};

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(as_text(&Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(as_count(&Value::deserialize(deserializer)?))
    }
}
