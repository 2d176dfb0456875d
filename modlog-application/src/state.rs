use std::sync::Arc;

use modlog_domain::ports::{EventRepository, PlayerRepository};
use modlog_domain::RuntimeConfig;

use crate::{IngestionPipeline, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub pipeline: Arc<IngestionPipeline>,
    pub player_repo: Arc<dyn PlayerRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub metrics: Arc<Metrics>,
}
