// Moderation log line parser
//
// Expected shape:
//   <Action> @ <M/D/YYYY, H:MM:SS AM|PM> <Location> [<Context>] <Username> (<PlayFabId>) <Reason> [<Duration>]

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

use crate::entities::ParsedEvent;
use crate::services::duration::extract_duration;
use crate::value_objects::{ModerationAction, PlayfabId};

static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?P<action>kick|ban)\s*@\s*",
        r"(?P<month>[0-9]{1,2})/(?P<day>[0-9]{1,2})/(?P<year>[0-9]{4}),\s*",
        r"(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{2}):(?P<second>[0-9]{2})\s*(?P<meridiem>AM|PM)\s+",
        r"(?P<location>[^\[]+)\s*",
        r"(?:\[(?P<context>[^\]]+)\])?\s+",
        r"(?P<username>.+?)\s*\(\s*(?P<playfab>[0-9A-Fa-f]{8,32})\s*\)\s+",
        r"(?P<reason>.+)$",
    ))
    .expect("hard-coded regular expression to be valid")
});

/// Parses one log line into a [`ParsedEvent`].
///
/// Returns `None` for anything that does not fit the grammar, including
/// lines whose timestamp has the right shape but is not a real calendar
/// time (hour 13, February 30, ...). Unrelated chat lines are expected
/// input, so there is no error type here.
pub fn parse_line(line: &str) -> Option<ParsedEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let caps = LINE_REGEX.captures(line)?;

    let action = ModerationAction::from_keyword(caps.name("action")?.as_str())?;
    let occurred_at = parse_timestamp(&caps)?;
    let location = non_empty(caps.name("location").map(|m| m.as_str()));
    let context = non_empty(caps.name("context").map(|m| m.as_str()));
    let username = caps.name("username")?.as_str().trim().to_string();
    let playfab_id = PlayfabId::parse(caps.name("playfab")?.as_str())?;
    let (reason, duration_seconds) = extract_duration(caps.name("reason")?.as_str().trim());

    Some(ParsedEvent {
        action,
        occurred_at,
        location,
        context,
        username,
        playfab_id,
        reason,
        duration_seconds,
        raw_text: line.to_string(),
    })
}

fn parse_timestamp(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    let field = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
    if year < 1 {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;

    let hour12 = field("hour")?;
    if !(1..=12).contains(&hour12) {
        return None;
    }
    let is_pm = caps.name("meridiem")?.as_str().eq_ignore_ascii_case("pm");
    let hour = match (hour12, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    let time = NaiveTime::from_hms_opt(hour, field("minute")?, field("second")?)?;
    Some(NaiveDateTime::new(date, time))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToString::to_string)
}
