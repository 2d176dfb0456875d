// Event entity
// Represents a kick/ban extracted from a moderation log line

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::value_objects::{ModerationAction, PlayerKey, PlayfabId, SourceRef};

/// Structured result of parsing a single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub action: ModerationAction,
    pub occurred_at: NaiveDateTime,
    pub location: Option<String>,
    pub context: Option<String>,
    pub username: String,
    pub playfab_id: PlayfabId,
    pub reason: String,
    pub duration_seconds: Option<i64>,
    pub raw_text: String,
}

/// Row handed to the event store; carries the dedup fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModerationEvent {
    pub player: PlayerKey,
    pub action: ModerationAction,
    pub occurred_at: NaiveDateTime,
    pub location: Option<String>,
    pub context: Option<String>,
    pub reason: String,
    pub duration_seconds: Option<i64>,
    pub raw_text: String,
    pub source: SourceRef,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub id: i64,
    pub player: PlayerKey,
    pub action: ModerationAction,
    pub occurred_at: NaiveDateTime,
    pub location: Option<String>,
    pub context: Option<String>,
    pub reason: String,
    pub duration_seconds: Option<i64>,
    pub raw_text: String,
    pub source: SourceRef,
    pub fingerprint: String,
}
