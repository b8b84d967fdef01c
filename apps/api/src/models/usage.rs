use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::generation::request::ContentCategory;
use crate::models::content::ModelTier;

/// One provider spend entry. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CostRecord {
    pub id: Uuid,
    pub model: String,
    pub tokens_used: i32,
    pub cost: f64,
    pub category: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub content_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCostRecord {
    pub tier: ModelTier,
    pub tokens_used: u32,
    pub cost: f64,
    pub category: ContentCategory,
    pub success: bool,
    pub error_message: Option<String>,
    pub content_id: Option<Uuid>,
}

impl NewCostRecord {
    pub fn succeeded(
        tier: ModelTier,
        tokens_used: u32,
        cost: f64,
        category: ContentCategory,
        content_id: Uuid,
    ) -> Self {
        Self {
            tier,
            tokens_used,
            cost,
            category,
            success: true,
            error_message: None,
            content_id: Some(content_id),
        }
    }

    /// Failed attempts cost nothing and link to no content.
    pub fn failed(tier: ModelTier, category: ContentCategory, error: impl Into<String>) -> Self {
        Self {
            tier,
            tokens_used: 0,
            cost: 0.0,
            category,
            success: false,
            error_message: Some(error.into()),
            content_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_type: String,
    pub content_id: Option<Uuid>,
    pub data: Value,
}

/// Scoring columns of one library row, for aggregation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContentStat {
    pub category: String,
    pub platform: Option<String>,
    pub quality_score: f64,
    pub seo_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct EventCount {
    pub event_type: String,
    pub count: i64,
}
