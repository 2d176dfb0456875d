use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use modlog_application::queries::player_queries;
use modlog_application::{AppError, AppState};
use modlog_domain::PlayerHistory;

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(Debug, Deserialize)]
pub struct PlayerHistoryQuery {
    pub limit: Option<usize>,
}

pub async fn get_player_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(playfab_id): Path<String>,
    Query(query): Query<PlayerHistoryQuery>,
) -> Result<Json<PlayerHistory>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(AppError::Unauthorized.into());
    }
    let history = player_queries::get_player_history(&state, &playfab_id, query.limit)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("player '{}'", playfab_id.trim())))?;
    Ok(Json(history))
}
