use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use modlog_application::commands::{ingest_commands, submission_commands};
use modlog_application::{AppError, AppState, SubmissionOutcome};

use crate::error::HttpError;
use crate::middleware::{authorize, parse_submission};

pub async fn ingest_submission(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<SubmissionOutcome>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(AppError::Unauthorized.into());
    }

    let submission = parse_submission(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        error!("failed to parse submission body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    match ingest_commands::process_submission(&state, submission).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err @ AppError::Storage(_)) => Err(HttpError::Internal(
            submission_commands::failure_reply(&err),
        )),
        Err(err) => Err(err.into()),
    }
}
