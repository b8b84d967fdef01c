use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and which optional collaborators are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let budget = state.orchestrator.budget().policy();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "content-engine",
        "secondary_provider": state.orchestrator.gateway().has_secondary(),
        "budget_control": budget.is_enabled(),
        "monthly_budget": budget.monthly_budget,
        "daily_api_limit": state.config.daily_api_limit,
    }))
}
