use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{WatchError, WatchResult};

/// Largest group a single tee time booking can hold.
pub const MAX_PLAYERS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Active,
    Paused,
}

impl WatchStatus {
    pub fn toggled(self) -> Self {
        match self {
            WatchStatus::Active => WatchStatus::Paused,
            WatchStatus::Paused => WatchStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckFrequency {
    #[default]
    #[serde(rename = "15")]
    Fifteen,
    #[serde(rename = "30")]
    Thirty,
    #[serde(rename = "60")]
    Sixty,
}

impl CheckFrequency {
    pub fn minutes(self) -> u32 {
        match self {
            CheckFrequency::Fifteen => 15,
            CheckFrequency::Thirty => 30,
            CheckFrequency::Sixty => 60,
        }
    }

    pub fn from_minutes(minutes: u32) -> WatchResult<Self> {
        match minutes {
            15 => Ok(CheckFrequency::Fifteen),
            30 => Ok(CheckFrequency::Thirty),
            60 => Ok(CheckFrequency::Sixty),
            other => Err(WatchError::Validation(format!(
                "check frequency must be 15, 30 or 60 minutes, got {}",
                other
            ))),
        }
    }
}

/// Preferred tee-off window. `start <= end` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(rename = "timeWindowStart", with = "hhmm")]
    pub start: NaiveTime,
    #[serde(rename = "timeWindowEnd", with = "hhmm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRequest {
    pub id: String,
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_url: Option<String>,
    pub dates: Vec<NaiveDate>,
    #[serde(flatten)]
    pub time_window: TimeWindow,
    pub players: u8,
    #[serde(rename = "email")]
    pub notify_email: String,
    #[serde(rename = "frequency", default)]
    pub check_frequency: CheckFrequency,
    pub status: WatchStatus,
    pub created_at: DateTime<Utc>,
}

/// Form payload used to create a watch request or replace the editable
/// fields of an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchRequest {
    pub course_name: String,
    #[serde(default)]
    pub course_url: Option<String>,
    pub dates: Vec<NaiveDate>,
    #[serde(flatten)]
    pub time_window: TimeWindow,
    pub players: u8,
    #[serde(rename = "email")]
    pub notify_email: String,
    #[serde(rename = "frequency", default)]
    pub check_frequency: CheckFrequency,
}

impl NewWatchRequest {
    pub fn validate(&self) -> WatchResult<()> {
        if self.course_name.trim().is_empty() {
            return Err(WatchError::Validation("course name is required".to_string()));
        }
        if self.dates.is_empty() {
            return Err(WatchError::Validation(
                "at least one date is required".to_string(),
            ));
        }
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(WatchError::Validation(format!(
                "players must be between 1 and {}, got {}",
                MAX_PLAYERS, self.players
            )));
        }
        if self.notify_email.trim().is_empty() {
            return Err(WatchError::Validation(
                "notification email is required".to_string(),
            ));
        }
        Ok(())
    }

    fn normalized_dates(&self) -> Vec<NaiveDate> {
        let mut dates = self.dates.clone();
        dates.sort();
        dates.dedup();
        dates
    }
}

impl WatchRequest {
    /// Validates the draft and turns it into a fresh, active watch request.
    pub fn create(draft: NewWatchRequest) -> WatchResult<Self> {
        draft.validate()?;
        let dates = draft.normalized_dates();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            course_name: draft.course_name.trim().to_string(),
            course_url: draft.course_url.filter(|url| !url.trim().is_empty()),
            dates,
            time_window: draft.time_window,
            players: draft.players,
            notify_email: draft.notify_email.trim().to_string(),
            check_frequency: draft.check_frequency,
            status: WatchStatus::Active,
            created_at: Utc::now(),
        })
    }

    /// Replaces the editable fields, keeping id, status and creation time.
    pub fn apply_edit(&self, draft: NewWatchRequest) -> WatchResult<Self> {
        draft.validate()?;
        let dates = draft.normalized_dates();

        Ok(Self {
            id: self.id.clone(),
            course_name: draft.course_name.trim().to_string(),
            course_url: draft.course_url.filter(|url| !url.trim().is_empty()),
            dates,
            time_window: draft.time_window,
            players: draft.players,
            notify_email: draft.notify_email.trim().to_string(),
            check_frequency: draft.check_frequency,
            status: self.status,
            created_at: self.created_at,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == WatchStatus::Active
    }

    pub fn draft(&self) -> NewWatchRequest {
        NewWatchRequest {
            course_name: self.course_name.clone(),
            course_url: self.course_url.clone(),
            dates: self.dates.clone(),
            time_window: self.time_window,
            players: self.players,
            notify_email: self.notify_email.clone(),
            check_frequency: self.check_frequency,
        }
    }
}

/// `HH:MM` wall-clock times, the form the booking UI stores them in.
/// Seconds are accepted on input and dropped on output.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|e| format!("invalid time '{}': {}", raw, e))
    }
}
