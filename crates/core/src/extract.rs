//! # Search Response Extraction
//!
//! The search agent does not return a fixed schema. Depending on the agent
//! runtime the matches can sit under `response.result`, directly under
//! `response`, under a top-level `result`, or at the top level of the
//! envelope, and field names drift between `snake_case` and `camelCase`.
//!
//! Extraction is modeled as an ordered list of [`ResponseShape`]s. Each shape
//! knows how to locate one candidate object inside the envelope; the first
//! candidate that carries evidence of a match wins. New shapes can be added
//! without touching the existing ones.
//!
//! Extraction never fails. Missing or malformed fields degrade to defaults and
//! an unrecognised envelope simply yields `found = false`.

use serde_json::{Map, Value};

use crate::models::tee_time::{DEFAULT_PRICE, TeeTimeMatch};

const MATCHES_KEYS: &[&str] = &["matching_tee_times", "matchingTeeTimes"];
const FOUND_KEYS: &[&str] = &["matches_found", "matchesFound"];
const TOTAL_KEYS: &[&str] = &["total_matches", "totalMatches"];
const COURSE_KEYS: &[&str] = &["course_name", "courseName"];

const DATE_KEYS: &[&str] = &["date", "tee_time_date", "teeTimeDate"];
const TIME_KEYS: &[&str] = &["time", "tee_time", "teeTime", "time_slot", "timeSlot"];
const SPOTS_KEYS: &[&str] = &["available_spots", "availableSpots", "spots"];
const PRICE_KEYS: &[&str] = &["price"];
const LINK_KEYS: &[&str] = &["booking_link", "bookingLink", "booking_url", "bookingUrl"];

/// Canonical result of interpreting a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The object the result was read from, or `Null` when the envelope held
    /// no object at all.
    pub payload: Value,
    pub matches: Vec<TeeTimeMatch>,
    pub found: bool,
    /// Name of the shape that produced `payload`.
    pub source: Option<&'static str>,
}

impl Extraction {
    pub fn course_name(&self) -> Option<&str> {
        course_name(&self.payload)
    }
}

/// One way of locating the result object inside a search response.
pub trait ResponseShape: Send + Sync {
    fn name(&self) -> &'static str;

    fn locate<'a>(&self, raw: &'a Value) -> Option<&'a Map<String, Value>>;

    /// Accepts the located candidate when it lists matches, declares
    /// `matches_found = true`, or reports a positive `total_matches`.
    fn try_extract(&self, raw: &Value) -> Option<Extraction> {
        let candidate = self.locate(raw)?;
        let matches = read_matches(candidate);

        let declares_found = lookup(candidate, FOUND_KEYS).and_then(Value::as_bool) == Some(true);
        let declares_total = lookup(candidate, TOTAL_KEYS)
            .and_then(as_number)
            .is_some_and(|total| total > 0.0);

        if matches.is_empty() && !declares_found && !declares_total {
            return None;
        }

        Some(Extraction {
            payload: Value::Object(candidate.clone()),
            matches,
            found: true,
            source: Some(self.name()),
        })
    }
}

/// An object reached by walking a fixed key path. The empty path is the
/// envelope itself.
#[derive(Debug, Clone, Copy)]
pub struct NestedObject {
    name: &'static str,
    path: &'static [&'static str],
}

impl NestedObject {
    pub const fn new(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path }
    }
}

impl ResponseShape for NestedObject {
    fn name(&self) -> &'static str {
        self.name
    }

    fn locate<'a>(&self, raw: &'a Value) -> Option<&'a Map<String, Value>> {
        self.path
            .iter()
            .try_fold(raw, |value, key| value.as_object()?.get(*key))?
            .as_object()
    }
}

/// The shapes observed from the agent runtime, most specific first.
pub fn default_shapes() -> Vec<Box<dyn ResponseShape>> {
    vec![
        Box::new(NestedObject::new("response.result", &["response", "result"])),
        Box::new(NestedObject::new("response", &["response"])),
        Box::new(NestedObject::new("result", &["result"])),
        Box::new(NestedObject::new("envelope", &[])),
    ]
}

pub struct Extractor {
    shapes: Vec<Box<dyn ResponseShape>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(default_shapes())
    }
}

impl Extractor {
    pub fn new(shapes: Vec<Box<dyn ResponseShape>>) -> Self {
        Self { shapes }
    }

    pub fn shape_names(&self) -> Vec<&'static str> {
        self.shapes.iter().map(|shape| shape.name()).collect()
    }

    pub fn extract(&self, raw: &Value) -> Extraction {
        if let Some(extraction) = self.shapes.iter().find_map(|shape| shape.try_extract(raw)) {
            return extraction;
        }

        // Nothing matched: keep the most informative candidate for diagnostics.
        let candidates: Vec<(&'static str, &Map<String, Value>)> = self
            .shapes
            .iter()
            .filter_map(|shape| shape.locate(raw).map(|object| (shape.name(), object)))
            .collect();

        let best = candidates
            .iter()
            .find(|(_, object)| lookup(object, COURSE_KEYS).is_some())
            .or_else(|| candidates.first());

        match best {
            Some((name, object)) => Extraction {
                payload: Value::Object((*object).clone()),
                matches: Vec::new(),
                found: false,
                source: Some(*name),
            },
            None => Extraction {
                payload: Value::Null,
                matches: Vec::new(),
                found: false,
                source: None,
            },
        }
    }
}

/// Course name reported by the agent, if it reported a non-empty one.
pub fn course_name(payload: &Value) -> Option<&str> {
    payload
        .as_object()
        .and_then(|object| lookup(object, COURSE_KEYS))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn read_matches(candidate: &Map<String, Value>) -> Vec<TeeTimeMatch> {
    lookup(candidate, MATCHES_KEYS)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(read_match).collect())
        .unwrap_or_default()
}

fn read_match(entry: &Value) -> TeeTimeMatch {
    let Some(object) = entry.as_object() else {
        return TeeTimeMatch::default();
    };

    TeeTimeMatch {
        date: lookup(object, DATE_KEYS).and_then(as_text).unwrap_or_default(),
        time: lookup(object, TIME_KEYS).and_then(as_text).unwrap_or_default(),
        available_spots: lookup(object, SPOTS_KEYS).map(as_count),
        price: lookup(object, PRICE_KEYS)
            .and_then(as_text)
            .filter(|price| !price.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRICE.to_string()),
        booking_link: lookup(object, LINK_KEYS).and_then(as_text).unwrap_or_default(),
    }
}

pub(crate) fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn as_count(value: &Value) -> u32 {
    match as_number(value) {
        Some(n) if n.is_finite() && n > 0.0 => n.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}
