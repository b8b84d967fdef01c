pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route("/v1/generate", post(handlers::handle_generate))
        // Library
        .route("/v1/content", get(handlers::handle_list_content))
        .route("/v1/content/:id", get(handlers::handle_get_content))
        .route("/v1/variants/:content_id", get(handlers::handle_get_variants))
        // Publishing
        .route("/v1/publish", post(handlers::handle_publish))
        // Costs
        .route("/v1/costs/usage", get(handlers::handle_usage))
        // Templates
        .route("/v1/templates", get(handlers::handle_list_templates))
        .route("/v1/templates/:id", get(handlers::handle_get_template))
        .route(
            "/v1/templates/:id/generate",
            post(handlers::handle_generate_from_template),
        )
        // Analytics
        .route("/v1/analytics/dashboard", get(handlers::handle_dashboard))
        .with_state(state)
}
