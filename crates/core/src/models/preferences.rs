use serde::{Deserialize, Serialize};

use super::watch_request::CheckFrequency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub default_email: String,
    #[serde(rename = "defaultFrequency", default)]
    pub default_check_frequency: CheckFrequency,
    #[serde(rename = "emailEnabled", default = "enabled")]
    pub email_notifications_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_email: String::new(),
            default_check_frequency: CheckFrequency::Fifteen,
            email_notifications_enabled: true,
        }
    }
}

/// Partial preferences; `None` fields are left untouched on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub default_email: Option<String>,
    #[serde(rename = "defaultFrequency")]
    pub default_check_frequency: Option<CheckFrequency>,
    #[serde(rename = "emailEnabled")]
    pub email_notifications_enabled: Option<bool>,
}

impl PreferencesUpdate {
    pub fn is_empty(&self) -> bool {
        self.default_email.is_none()
            && self.default_check_frequency.is_none()
            && self.email_notifications_enabled.is_none()
    }
}

impl Preferences {
    /// Shallow merge, last write wins per field.
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(email) = update.default_email {
            self.default_email = email;
        }
        if let Some(frequency) = update.default_check_frequency {
            self.default_check_frequency = frequency;
        }
        if let Some(enabled) = update.email_notifications_enabled {
            self.email_notifications_enabled = enabled;
        }
    }
}
