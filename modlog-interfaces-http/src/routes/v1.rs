use axum::Router;

use modlog_application::AppState;

use crate::handlers::{ingest_handlers, ops_handlers, query_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/ingest/submissions",
            axum::routing::post(ingest_handlers::ingest_submission),
        )
        .route(
            "/v1/players/:playfab_id",
            axum::routing::get(query_handlers::get_player_history),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
