//! In-memory store for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::ContentStore;
use crate::errors::AppError;
use crate::models::content::{ContentFilter, ContentPage, ContentRecord, ContentStatus, NewContent};
use crate::models::usage::{AnalyticsEvent, ContentStat, CostRecord, EventCount, NewCostRecord};
use crate::models::variant::{NewVariantSet, VariantSet};

#[derive(Default)]
pub struct MemoryStore {
    content: Mutex<Vec<ContentRecord>>,
    costs: Mutex<Vec<CostRecord>>,
    variant_sets: Mutex<Vec<VariantSet>>,
    events: Mutex<Vec<(DateTime<Utc>, AnalyticsEvent)>>,
    fail_content_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose content inserts fail like a lost database connection.
    pub fn failing_content_writes() -> Self {
        Self {
            fail_content_writes: true,
            ..Self::default()
        }
    }

    /// Seeds a cost record with an explicit timestamp.
    pub fn push_cost(&self, record: CostRecord) {
        self.costs.lock().unwrap().push(record);
    }

    pub fn costs(&self) -> Vec<CostRecord> {
        self.costs.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn all_content(&self) -> Vec<ContentRecord> {
        self.content.lock().unwrap().clone()
    }

    pub fn variant_sets(&self) -> Vec<VariantSet> {
        self.variant_sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_content(&self, content: NewContent) -> Result<ContentRecord, AppError> {
        if self.fail_content_writes {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let record = ContentRecord {
            id: Uuid::new_v4(),
            category: content.category.as_str().to_string(),
            topic: content.topic,
            body: content.body,
            metadata: Json(content.metadata),
            quality_score: content.quality_score,
            seo_score: content.seo_score,
            status: content.status.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.content.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError> {
        Ok(self
            .content
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_content(&self, filter: &ContentFilter) -> Result<ContentPage, AppError> {
        let mut matching: Vec<ContentRecord> = self
            .content
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status != ContentStatus::Variant.as_str())
            .filter(|c| filter.category.map_or(true, |cat| c.category == cat.as_str()))
            .filter(|c| filter.min_quality.map_or(true, |min| c.quality_score >= min))
            .cloned()
            .collect();
        matching.reverse();

        let total = matching.len() as i64;
        let items: Vec<ContentRecord> = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect();

        Ok(ContentPage {
            has_more: filter.offset + (items.len() as i64) < total,
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    async fn insert_cost_record(&self, record: NewCostRecord) -> Result<(), AppError> {
        self.costs.lock().unwrap().push(CostRecord {
            id: Uuid::new_v4(),
            model: record.tier.as_str().to_string(),
            tokens_used: record.tokens_used as i32,
            cost: record.cost,
            category: record.category.as_str().to_string(),
            success: record.success,
            error_message: record.error_message,
            content_id: record.content_id,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn cost_records_since(&self, since: DateTime<Utc>) -> Result<Vec<CostRecord>, AppError> {
        Ok(self
            .costs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_at >= since)
            .cloned()
            .collect())
    }

    async fn insert_variant_set(&self, set: NewVariantSet) -> Result<VariantSet, AppError> {
        let record = VariantSet {
            id: Uuid::new_v4(),
            original_id: set.original_id,
            variant_ids: set.variant_ids,
            parameter: set.parameter,
            status: "active".to_string(),
            winner_id: None,
            created_at: Utc::now(),
        };
        self.variant_sets.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn variant_set_for(&self, content_id: Uuid) -> Result<Option<VariantSet>, AppError> {
        Ok(self
            .variant_sets
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.variant_ids.contains(&content_id))
            .cloned())
    }

    async fn variants_of(&self, original_id: Uuid) -> Result<Vec<ContentRecord>, AppError> {
        Ok(self
            .content
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status == ContentStatus::Variant.as_str())
            .filter(|c| c.metadata.variant_of == Some(original_id))
            .cloned()
            .collect())
    }

    async fn insert_event(&self, event: AnalyticsEvent) -> Result<(), AppError> {
        self.events.lock().unwrap().push((Utc::now(), event));
        Ok(())
    }

    async fn content_stats_since(&self, since: DateTime<Utc>) -> Result<Vec<ContentStat>, AppError> {
        Ok(self
            .content
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.status != ContentStatus::Variant.as_str() && c.created_at >= since)
            .map(|c| ContentStat {
                category: c.category.clone(),
                platform: Some(c.metadata.platform.as_str().to_string()),
                quality_score: c.quality_score,
                seo_score: c.seo_score,
                created_at: c.created_at,
            })
            .collect())
    }

    async fn event_counts_since(&self, since: DateTime<Utc>) -> Result<Vec<EventCount>, AppError> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for (at, event) in self.events.lock().unwrap().iter() {
            if *at >= since {
                *counts.entry(event.event_type.clone()).or_default() += 1;
            }
        }
        let mut counts: Vec<EventCount> = counts
            .into_iter()
            .map(|(event_type, count)| EventCount { event_type, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }
}
