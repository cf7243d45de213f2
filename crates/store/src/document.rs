use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use teewatch_core::models::{Notification, Preferences, WatchRequest};

/// Most recent notifications kept in the document; older ones are evicted.
pub const MAX_NOTIFICATIONS: usize = 200;

/// The single JSON document backing the store.
///
/// `notifications` is ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub alerts: Vec<WatchRequest>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub settings: Preferences,
}

/// A document read from disk, with the records that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub document: StoreDocument,
    /// One entry per dropped record or section. Empty for a clean read.
    pub problems: Vec<String>,
}

impl StoreDocument {
    /// Parses a stored document, dropping individual records that do not fit
    /// the schema instead of rejecting the whole document.
    ///
    /// Fails only when `raw` is not a JSON object at all.
    pub fn parse(raw: &str) -> Result<ParsedDocument> {
        if let Ok(document) = serde_json::from_str::<StoreDocument>(raw) {
            return Ok(ParsedDocument {
                document,
                problems: Vec::new(),
            });
        }

        let value: Value = serde_json::from_str(raw).wrap_err("Document is not valid JSON")?;
        let object = value
            .as_object()
            .ok_or_else(|| eyre!("Document is not a JSON object"))?;

        let mut problems = Vec::new();
        let alerts = records(object, "alerts", &mut problems);
        let notifications = records(object, "notifications", &mut problems);
        let settings = match object.get("settings") {
            None | Some(Value::Null) => Preferences::default(),
            Some(settings) => serde_json::from_value(settings.clone()).unwrap_or_else(|e| {
                problems.push(format!("settings: {}", e));
                Preferences::default()
            }),
        };

        Ok(ParsedDocument {
            document: StoreDocument {
                alerts,
                notifications,
                settings,
            },
            problems,
        })
    }
}

fn records<T: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &str,
    problems: &mut Vec<String>,
) -> Vec<T> {
    match object.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    problems.push(format!("{}[{}]: {}", field, index, e));
                    None
                }
            })
            .collect(),
        Some(_) => {
            problems.push(format!("{} is not an array", field));
            Vec::new()
        }
    }
}
