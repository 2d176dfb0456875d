use chrono::NaiveDateTime;
use modlog_domain::ports::EventRepository;
use modlog_domain::{ModerationAction, NewModerationEvent, ParsedEvent, PlayerKey, SourceRef};
use sha2::{Digest, Sha256};

use crate::AppError;

/// Dedup key of a moderation event.
///
/// Only the action, the timestamp, the resolved player and the trimmed
/// reason participate; raw text, duration, location, context and source
/// are ignored so a re-posted log collapses onto the stored row.
pub fn event_fingerprint(
    action: ModerationAction,
    occurred_at: NaiveDateTime,
    player: PlayerKey,
    reason: &str,
) -> String {
    let basis = format!(
        "{}|{}|{}|{}",
        action.as_str(),
        occurred_at.format("%Y-%m-%dT%H:%M:%S"),
        player,
        reason.trim()
    );
    let digest = Sha256::digest(basis.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Stores `parsed` for `player` unless an event with the same fingerprint
/// exists. Returns whether a row was written.
pub async fn store_event_if_new(
    events: &dyn EventRepository,
    parsed: &ParsedEvent,
    player: PlayerKey,
    source: SourceRef,
) -> Result<bool, AppError> {
    let fingerprint = event_fingerprint(parsed.action, parsed.occurred_at, player, &parsed.reason);
    let event = NewModerationEvent {
        player,
        action: parsed.action,
        occurred_at: parsed.occurred_at,
        location: parsed.location.clone(),
        context: parsed.context.clone(),
        reason: parsed.reason.clone(),
        duration_seconds: parsed.duration_seconds,
        raw_text: parsed.raw_text.clone(),
        source,
        fingerprint,
    };
    Ok(events.insert_event_if_new(&event).await?)
}
