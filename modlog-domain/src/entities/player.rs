// Player identity entities

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::ModerationEvent;
use crate::value_objects::PlayerKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub key: PlayerKey,
    pub playfab_id: String,
    pub last_username: Option<String>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAlias {
    pub player: PlayerKey,
    pub alias: String,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerHistory {
    pub player: Player,
    pub aliases: Vec<PlayerAlias>,
    pub events: Vec<ModerationEvent>,
}
