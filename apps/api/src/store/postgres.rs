use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::ContentStore;
use crate::errors::AppError;
use crate::models::content::{ContentFilter, ContentPage, ContentRecord, ContentStatus, NewContent};
use crate::models::usage::{AnalyticsEvent, ContentStat, CostRecord, EventCount, NewCostRecord};
use crate::models::variant::{NewVariantSet, VariantSet};

/// Listing predicate shared by the page query and its count.
const LIBRARY_FILTER: &str = r#"
    WHERE status <> 'variant'
      AND ($1::text IS NULL OR category = $1)
      AND ($2::float8 IS NULL OR quality_score >= $2)
"#;

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert_content(&self, content: NewContent) -> Result<ContentRecord, AppError> {
        let record = sqlx::query_as::<_, ContentRecord>(
            r#"
            INSERT INTO content
                (id, category, topic, body, metadata, quality_score, seo_score, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(content.category.as_str())
        .bind(&content.topic)
        .bind(&content.body)
        .bind(Json(&content.metadata))
        .bind(content.quality_score)
        .bind(content.seo_score)
        .bind(content.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        debug!("Inserted content {} ({})", record.id, record.status);
        Ok(record)
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError> {
        Ok(
            sqlx::query_as::<_, ContentRecord>("SELECT * FROM content WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_content(&self, filter: &ContentFilter) -> Result<ContentPage, AppError> {
        let category = filter.category.map(|c| c.as_str());

        let items = sqlx::query_as::<_, ContentRecord>(&format!(
            "SELECT * FROM content {LIBRARY_FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(category)
        .bind(filter.min_quality)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM content {LIBRARY_FILTER}"))
            .bind(category)
            .bind(filter.min_quality)
            .fetch_one(&self.pool)
            .await?;

        Ok(ContentPage {
            has_more: filter.offset + (items.len() as i64) < total,
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    async fn insert_cost_record(&self, record: NewCostRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO api_usage
                (id, model, tokens_used, cost, category, success, error_message, content_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.tier.as_str())
        .bind(i32::try_from(record.tokens_used).unwrap_or(i32::MAX))
        .bind(record.cost)
        .bind(record.category.as_str())
        .bind(record.success)
        .bind(&record.error_message)
        .bind(record.content_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn cost_records_since(&self, since: DateTime<Utc>) -> Result<Vec<CostRecord>, AppError> {
        Ok(sqlx::query_as::<_, CostRecord>(
            "SELECT * FROM api_usage WHERE created_at >= $1 ORDER BY created_at",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_variant_set(&self, set: NewVariantSet) -> Result<VariantSet, AppError> {
        Ok(sqlx::query_as::<_, VariantSet>(
            r#"
            INSERT INTO variant_sets (id, original_id, variant_ids, parameter, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(set.original_id)
        .bind(&set.variant_ids)
        .bind(&set.parameter)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn variant_set_for(&self, content_id: Uuid) -> Result<Option<VariantSet>, AppError> {
        Ok(sqlx::query_as::<_, VariantSet>(
            r#"
            SELECT * FROM variant_sets
            WHERE $1 = ANY(variant_ids)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn variants_of(&self, original_id: Uuid) -> Result<Vec<ContentRecord>, AppError> {
        Ok(sqlx::query_as::<_, ContentRecord>(
            r#"
            SELECT * FROM content
            WHERE status = $1 AND metadata->>'variant_of' = $2
            ORDER BY created_at
            "#,
        )
        .bind(ContentStatus::Variant.as_str())
        .bind(original_id.to_string())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_event(&self, event: AnalyticsEvent) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO analytics_events (id, event_type, content_id, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(&event.event_type)
        .bind(event.content_id)
        .bind(&event.data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn content_stats_since(&self, since: DateTime<Utc>) -> Result<Vec<ContentStat>, AppError> {
        Ok(sqlx::query_as::<_, ContentStat>(
            r#"
            SELECT category, metadata->>'platform' AS platform, quality_score, seo_score, created_at
            FROM content
            WHERE status <> $1 AND created_at >= $2
            ORDER BY created_at
            "#,
        )
        .bind(ContentStatus::Variant.as_str())
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn event_counts_since(&self, since: DateTime<Utc>) -> Result<Vec<EventCount>, AppError> {
        Ok(sqlx::query_as::<_, EventCount>(
            r#"
            SELECT event_type, COUNT(*) AS count
            FROM analytics_events
            WHERE created_at >= $1
            GROUP BY event_type
            ORDER BY count DESC, event_type
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }
}
