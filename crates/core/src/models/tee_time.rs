use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE: &str = "see booking site";

/// One available tee time slot reported by the search agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeeTimeMatch {
    pub date: String,
    pub time: String,
    /// `None` when the agent did not report a count.
    pub available_spots: Option<u32>,
    pub price: String,
    pub booking_link: String,
}

impl Default for TeeTimeMatch {
    fn default() -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            available_spots: None,
            price: DEFAULT_PRICE.to_string(),
            booking_link: String::new(),
        }
    }
}
