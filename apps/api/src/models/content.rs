use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::generation::request::{ContentCategory, Platform, Tone};

/// Which generation path produced a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Standard,
    MultiModel,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Standard => "standard",
            ModelTier::MultiModel => "multi_model",
        }
    }
}

/// Lifecycle status. Content is written once as `ready` or `variant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Ready,
    Variant,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Ready => "ready",
            ContentStatus::Variant => "variant",
        }
    }
}

/// Structured metadata stored alongside the body as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub keywords: Vec<String>,
    pub tone: Tone,
    pub platform: Platform,
    #[serde(default)]
    pub target_audience: Option<String>,
    pub model_tier: ModelTier,
    /// Provider model that produced (or synthesized) the final text.
    pub model: String,
    pub premium: bool,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Set on variant rows: the content they were derived from.
    #[serde(default)]
    pub variant_of: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentRecord {
    pub id: Uuid,
    pub category: String,
    pub topic: String,
    pub body: String,
    pub metadata: Json<ContentMetadata>,
    pub quality_score: f64,
    pub seo_score: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub category: ContentCategory,
    pub topic: String,
    pub body: String,
    pub metadata: ContentMetadata,
    pub quality_score: f64,
    pub seo_score: f64,
    pub status: ContentStatus,
}

/// Library listing filter. Variant rows are never listed.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFilter {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub category: Option<ContentCategory>,
    #[serde(default)]
    pub min_quality: Option<f64>,
}

fn default_limit() -> i64 {
    10
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            category: None,
            min_quality: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentPage {
    pub items: Vec<ContentRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}
