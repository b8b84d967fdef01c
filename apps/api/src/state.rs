use std::sync::Arc;

use crate::config::Config;
use crate::generation::orchestrator::ContentOrchestrator;
use crate::store::ContentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    /// Owns the provider gateway, budget guard and job queue.
    pub orchestrator: Arc<ContentOrchestrator>,
    pub config: Config,
}
