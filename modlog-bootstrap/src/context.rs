use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use modlog_application::{AppState, IngestionPipeline, Metrics};
use modlog_domain::EventRepository;
use modlog_infrastructure::{AppConfig, SqliteRepo};

/// Owns the connection pool; everything below receives ready handles.
pub struct AppContext {
    pub state: AppState,
    repo: Arc<SqliteRepo>,
}

impl AppContext {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path).await?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let repo = Arc::new(SqliteRepo::connect(&db_config).await?);
        repo.ensure_schema().await?;

        let pipeline = IngestionPipeline::new(repo.clone(), repo.clone(), config.to_ingest_config());
        let state = AppState {
            config: runtime_config,
            pipeline: Arc::new(pipeline),
            player_repo: repo.clone(),
            event_repo: repo.clone(),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state, repo })
    }

    pub async fn shutdown(&self) {
        self.repo.close().await;
    }
}
