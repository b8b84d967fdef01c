use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::generation::gateway::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Admission control rejected the request.
    #[error("Budget exceeded: {message}")]
    BudgetExceeded {
        message: String,
        current_spend: f64,
        ceiling: f64,
    },

    #[error("All providers failed: {0}")]
    AllProvidersFailed(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::AllProvidersFailed(causes) => {
                AppError::AllProvidersFailed(causes.join("; "))
            }
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): (StatusCode, &str, String, Option<Value>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
                AppError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                AppError::BudgetExceeded {
                    message,
                    current_spend,
                    ceiling,
                } => {
                    tracing::warn!("Budget exceeded: {message}");
                    (
                        StatusCode::PAYMENT_REQUIRED,
                        "BUDGET_EXCEEDED",
                        message.clone(),
                        Some(json!({
                            "current_spend": current_spend,
                            "ceiling": ceiling,
                        })),
                    )
                }
                AppError::AllProvidersFailed(msg) => {
                    tracing::error!("All providers failed: {msg}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "ALL_PROVIDERS_FAILED",
                        "Every configured AI provider failed to generate content".to_string(),
                        None,
                    )
                }
                AppError::Llm(msg) => {
                    tracing::error!("LLM error: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "LLM_ERROR",
                        "An AI processing error occurred".to_string(),
                        None,
                    )
                }
                AppError::Database(e) => {
                    tracing::error!("Database error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "A database error occurred".to_string(),
                        None,
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                        None,
                    )
                }
            };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
