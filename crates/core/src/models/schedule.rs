use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A periodic job owned by the external scheduler service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub cron_expression: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub next_run_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    #[serde(default)]
    pub id: Option<String>,
    pub executed_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default = "first_attempt")]
    pub attempt: u32,
    #[serde(default = "first_attempt")]
    pub max_attempts: u32,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn first_attempt() -> u32 {
    1
}

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Renders the common five-field cron shapes as English. Anything it does not
/// recognise is returned unchanged.
pub fn cron_to_human(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
        return expression.to_string();
    };

    if *day_of_month != "*" || *month != "*" {
        return expression.to_string();
    }

    let step = |field: &str| field.strip_prefix("*/").and_then(|n| n.parse::<u32>().ok());
    let number = |field: &str| field.parse::<u32>().ok();

    let described = match (*minute, *hour) {
        ("*", "*") => Some("Every minute".to_string()),
        (m, "*") if step(m).is_some() => step(m).map(|n| plural_every(n, "minute")),
        (m, "*") if number(m) == Some(0) => Some("Every hour".to_string()),
        (m, "*") => number(m).map(|n| format!("Every hour at :{:02}", n)),
        (m, h) if number(m).is_some() && step(h).is_some() => {
            step(h).map(|n| plural_every(n, "hour"))
        }
        (m, h) => match (number(m), number(h)) {
            (Some(m), Some(h)) => clock(h, m).map(|time| format!("at {}", time)),
            _ => None,
        },
    };

    let Some(described) = described else {
        return expression.to_string();
    };

    // Only fixed clock times read naturally with a day prefix.
    let fixed_time = described.starts_with("at ");
    match (*day_of_week, fixed_time) {
        ("*", true) => format!("Daily {}", described),
        ("*", false) => described,
        ("1-5", true) => format!("Weekdays {}", described),
        ("0,6" | "6,0", true) => format!("Weekends {}", described),
        (dow, true) => match dow.parse::<usize>().ok().and_then(|d| WEEKDAYS.get(d % 7)) {
            Some(day) => format!("Every {} {}", day, described),
            None => expression.to_string(),
        },
        _ => expression.to_string(),
    }
}

fn plural_every(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("Every {}", unit)
    } else {
        format!("Every {} {}s", n, unit)
    }
}

fn clock(hour: u32, minute: u32) -> Option<String> {
    NaiveTime::from_hms_opt(hour, minute, 0).map(|t| t.format("%-I:%M %p").to_string())
}
