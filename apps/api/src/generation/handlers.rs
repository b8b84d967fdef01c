//! Axum route handlers for the content API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::budget::UsageReport;
use crate::generation::dashboard::{dashboard_metrics, DashboardMetrics, DashboardQuery};
use crate::generation::orchestrator::GenerationResult;
use crate::generation::publish::{prepare_publication, PublishRequest, PublishResponse};
use crate::generation::request::GenerationRequest;
use crate::generation::templates::{
    catalog, find_template, generate_from_template, ContentTemplate, TemplateCatalog,
    TemplateGenerateRequest, TemplateOutput,
};
use crate::models::content::{ContentFilter, ContentPage, ContentRecord};
use crate::models::variant::VariantSet;
use crate::state::AppState;
use crate::store::validate_filter;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VariantComparison {
    pub variant_set: VariantSet,
    pub original: Option<ContentRecord>,
    pub variants: Vec<ContentRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /v1/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let result = state.orchestrator.generate(req).await?;
    Ok(Json(result))
}

/// GET /v1/content/:id
pub async fn handle_get_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentRecord>, AppError> {
    let content = state
        .store
        .get_content(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;
    Ok(Json(content))
}

/// GET /v1/content
pub async fn handle_list_content(
    State(state): State<AppState>,
    Query(filter): Query<ContentFilter>,
) -> Result<Json<ContentPage>, AppError> {
    validate_filter(&filter)?;
    Ok(Json(state.store.list_content(&filter).await?))
}

/// POST /v1/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, AppError> {
    let response = prepare_publication(&state.orchestrator, req, Utc::now()).await?;
    Ok(Json(response))
}

/// GET /v1/variants/:content_id
pub async fn handle_get_variants(
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
) -> Result<Json<VariantComparison>, AppError> {
    let variant_set = state
        .store
        .variant_set_for(content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No variants found for content {content_id}")))?;

    let original = state.store.get_content(variant_set.original_id).await?;
    let variants = state.store.variants_of(variant_set.original_id).await?;

    Ok(Json(VariantComparison {
        variant_set,
        original,
        variants,
    }))
}

/// GET /v1/costs/usage
pub async fn handle_usage(State(state): State<AppState>) -> Result<Json<UsageReport>, AppError> {
    let report = state.orchestrator.budget().usage_report().await?;
    Ok(Json(report))
}

/// GET /v1/analytics/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardMetrics>, AppError> {
    let metrics = dashboard_metrics(state.store.as_ref(), query.days, Utc::now()).await?;
    Ok(Json(metrics))
}

/// GET /v1/templates
pub async fn handle_list_templates() -> Json<TemplateCatalog> {
    Json(catalog())
}

/// GET /v1/templates/:id
pub async fn handle_get_template(
    Path(id): Path<String>,
) -> Result<Json<&'static ContentTemplate>, AppError> {
    Ok(Json(find_template(&id)?))
}

/// POST /v1/templates/:id/generate
pub async fn handle_generate_from_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TemplateGenerateRequest>,
) -> Result<Json<TemplateOutput>, AppError> {
    let output = generate_from_template(&state.orchestrator, &id, req).await?;
    Ok(Json(output))
}
