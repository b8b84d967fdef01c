mod config;
mod db;
mod errors;
mod generation;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::generation::budget::{BudgetGuard, BudgetPolicy};
use crate::generation::gateway::ProviderGateway;
use crate::generation::orchestrator::{ContentOrchestrator, OrchestratorSettings};
use crate::jobs::{JobQueue, JobWorker, WebhookNotifier};
use crate::llm_client::openai::OpenAiProvider;
use crate::llm_client::{AnthropicProvider, TextProvider};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{ContentStore, PgContentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting content engine v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(db));

    // Initialize providers
    let primary: Arc<dyn TextProvider> = Arc::new(OpenAiProvider::new(config.openai_api_key.clone())?);
    let secondary: Option<Arc<dyn TextProvider>> = match &config.anthropic_api_key {
        Some(key) => Some(Arc::new(AnthropicProvider::new(key.clone())?)),
        None => None,
    };
    info!(
        primary = primary.model(),
        secondary = secondary.as_ref().map(|s| s.model()),
        "Providers initialized"
    );
    let gateway = ProviderGateway::new(primary, secondary, config.max_output_tokens);

    let budget = BudgetGuard::new(
        BudgetPolicy::new(config.monthly_ai_budget, config.daily_api_limit),
        store.clone(),
    );

    // Background jobs
    let (jobs, receiver) = JobQueue::new(config.job_queue_capacity);
    let orchestrator = Arc::new(ContentOrchestrator::new(
        gateway,
        budget,
        store.clone(),
        jobs,
        OrchestratorSettings {
            max_target_words: config.max_content_length,
            content_generated_webhook: config.webhook_content_generated_url.clone(),
            content_published_webhook: config.webhook_content_published_url.clone(),
        },
    ));
    let worker = Arc::new(JobWorker::new(
        orchestrator.clone(),
        store.clone(),
        WebhookNotifier::new()?,
        config.job_max_attempts,
    ));
    tokio::spawn(worker.run(receiver));

    // Build app state
    let state = AppState {
        store,
        orchestrator,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
