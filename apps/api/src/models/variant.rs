use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VariantSet {
    pub id: Uuid,
    pub original_id: Uuid,
    /// The original first, then each variant in generation order.
    pub variant_ids: Vec<Uuid>,
    pub parameter: String,
    pub status: String,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVariantSet {
    pub original_id: Uuid,
    pub variant_ids: Vec<Uuid>,
    pub parameter: String,
}
