// Moderation action value object

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModerationAction {
    Kick,
    Ban,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Kick => "Kick",
            ModerationAction::Ban => "Ban",
        }
    }

    /// Matches the action keyword of a log line in any letter case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "kick" => Some(ModerationAction::Kick),
            "ban" => Some(ModerationAction::Ban),
            _ => None,
        }
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
