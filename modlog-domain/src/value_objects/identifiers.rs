// Identifier value objects

use std::fmt;

use serde::{Deserialize, Serialize};

const PLAYFAB_ID_MIN_LEN: usize = 8;
const PLAYFAB_ID_MAX_LEN: usize = 32;

/// Stable external player identifier, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayfabId(String);

impl PlayfabId {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() < PLAYFAB_ID_MIN_LEN || trimmed.len() > PLAYFAB_ID_MAX_LEN {
            return None;
        }
        if !trimmed.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayfabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage key of a canonical player row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey(pub i64);

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a batch of lines came from (chat message / channel), if known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub message_id: Option<i64>,
    pub channel_id: Option<i64>,
}

impl SourceRef {
    pub fn new(message_id: Option<i64>, channel_id: Option<i64>) -> Self {
        Self {
            message_id,
            channel_id,
        }
    }
}
