use tracing::error;

use modlog_domain::{PlayerHistory, PlayfabId};

use crate::{AppError, AppState};

pub const DEFAULT_EVENT_LIMIT: usize = 50;
pub const MAX_EVENT_LIMIT: usize = 500;

pub async fn get_player_history(
    state: &AppState,
    raw_playfab_id: &str,
    limit: Option<usize>,
) -> Result<Option<PlayerHistory>, AppError> {
    let playfab_id = PlayfabId::parse(raw_playfab_id).ok_or_else(|| {
        AppError::BadRequest(format!(
            "playfab_id must be 8-32 hex characters, got '{}'",
            raw_playfab_id.trim()
        ))
    })?;
    let limit = clamp_limit(limit);

    let Some(player) = state
        .player_repo
        .find_player(&playfab_id)
        .await
        .map_err(|err| {
            error!("failed to load player {}: {}", playfab_id, err);
            AppError::Storage(err)
        })?
    else {
        return Ok(None);
    };

    let aliases = state.player_repo.list_aliases(player.key).await?;
    let events = state.event_repo.list_events(player.key, limit).await?;
    Ok(Some(PlayerHistory {
        player,
        aliases,
        events,
    }))
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT)
}
