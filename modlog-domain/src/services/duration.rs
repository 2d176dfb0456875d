// Trailing duration extraction
// Splits "Temporary ban 2 hours" into ("Temporary ban", 7200 seconds)

use std::sync::LazyLock;

use regex::Regex;

static DURATION_TAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([0-9]+)\s*(seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w)\b\s*$",
    )
    .expect("hard-coded regular expression to be valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub fn seconds(&self) -> i64 {
        match self {
            DurationUnit::Seconds => 1,
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 3_600,
            DurationUnit::Days => 86_400,
            DurationUnit::Weeks => 604_800,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(DurationUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Some(DurationUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(DurationUnit::Hours),
            "d" | "day" | "days" => Some(DurationUnit::Days),
            "w" | "week" | "weeks" => Some(DurationUnit::Weeks),
            _ => None,
        }
    }
}

/// Strips a trailing `<quantity> <unit>` expression from `text`.
///
/// Returns the remaining text and the duration in seconds. A zero quantity
/// still removes the tail but yields no duration. Quantities that overflow
/// are left in place and treated as plain text.
pub fn extract_duration(text: &str) -> (String, Option<i64>) {
    let Some(caps) = DURATION_TAIL_REGEX.captures(text) else {
        return (text.trim().to_string(), None);
    };
    let (Some(tail), Some(quantity), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return (text.trim().to_string(), None);
    };

    let Some(unit) = DurationUnit::from_token(unit.as_str()) else {
        return (text.trim().to_string(), None);
    };
    let Some(seconds) = quantity
        .as_str()
        .parse::<i64>()
        .ok()
        .and_then(|qty| qty.checked_mul(unit.seconds()))
    else {
        return (text.trim().to_string(), None);
    };

    let remainder = text[..tail.start()].trim_end().to_string();
    let seconds = if seconds == 0 { None } else { Some(seconds) };
    (remainder, seconds)
}
