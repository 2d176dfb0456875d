use chrono::NaiveDateTime;
use modlog_domain::ports::PlayerRepository;
use modlog_domain::{PlayerKey, PlayfabId};

use crate::AppError;

/// Maps a PlayFab id plus the name it was seen under onto the canonical
/// player, widening its seen window and recording the name as an alias.
///
/// Both writes are single upserts in the store, so replaying the same
/// observation is a no-op and concurrent callers cannot narrow a window.
pub async fn resolve_identity(
    players: &dyn PlayerRepository,
    playfab_id: &PlayfabId,
    display_name: &str,
    observed_at: NaiveDateTime,
) -> Result<PlayerKey, AppError> {
    let display_name = normalize_display_name(display_name);
    let key = players
        .upsert_player(playfab_id, display_name, Some(observed_at))
        .await?;
    if let Some(alias) = display_name {
        players.record_alias(key, alias, Some(observed_at)).await?;
    }
    Ok(key)
}

fn normalize_display_name(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
