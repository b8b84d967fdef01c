//! Persistence seam for generated content, cost records, variant sets and
//! analytics events.
//!
//! `AppState` carries an `Arc<dyn ContentStore>`; production uses
//! [`PgContentStore`], tests use the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{ContentFilter, ContentPage, ContentRecord, NewContent};
use crate::models::usage::{AnalyticsEvent, ContentStat, CostRecord, EventCount, NewCostRecord};
use crate::models::variant::{NewVariantSet, VariantSet};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgContentStore;

pub const MAX_PAGE_SIZE: i64 = 100;

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, content: NewContent) -> Result<ContentRecord, AppError>;

    async fn get_content(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError>;

    /// Newest first. Variant rows are excluded.
    async fn list_content(&self, filter: &ContentFilter) -> Result<ContentPage, AppError>;

    async fn insert_cost_record(&self, record: NewCostRecord) -> Result<(), AppError>;

    async fn cost_records_since(&self, since: DateTime<Utc>) -> Result<Vec<CostRecord>, AppError>;

    async fn insert_variant_set(&self, set: NewVariantSet) -> Result<VariantSet, AppError>;

    /// The variant set whose members include `content_id`, newest first.
    async fn variant_set_for(&self, content_id: Uuid) -> Result<Option<VariantSet>, AppError>;

    /// Variant rows derived from `original_id`, oldest first.
    async fn variants_of(&self, original_id: Uuid) -> Result<Vec<ContentRecord>, AppError>;

    async fn insert_event(&self, event: AnalyticsEvent) -> Result<(), AppError>;

    /// Library rows (variants excluded) created at or after `since`.
    async fn content_stats_since(&self, since: DateTime<Utc>) -> Result<Vec<ContentStat>, AppError>;

    /// Events per type since `since`, most frequent first.
    async fn event_counts_since(&self, since: DateTime<Utc>) -> Result<Vec<EventCount>, AppError>;
}

/// Rejects out-of-range paging before it reaches a store.
pub fn validate_filter(filter: &ContentFilter) -> Result<(), AppError> {
    if !(1..=MAX_PAGE_SIZE).contains(&filter.limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    if filter.offset < 0 {
        return Err(AppError::Validation("offset must not be negative".to_string()));
    }
    if let Some(min) = filter.min_quality {
        if !(0.0..=1.0).contains(&min) {
            return Err(AppError::Validation(
                "min_quality must be between 0 and 1".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_bounds() {
        assert!(validate_filter(&ContentFilter::default()).is_ok());

        let too_big = ContentFilter {
            limit: 101,
            ..ContentFilter::default()
        };
        assert!(validate_filter(&too_big).is_err());

        let negative = ContentFilter {
            offset: -1,
            ..ContentFilter::default()
        };
        assert!(validate_filter(&negative).is_err());

        let bad_quality = ContentFilter {
            min_quality: Some(1.5),
            ..ContentFilter::default()
        };
        assert!(validate_filter(&bad_quality).is_err());
    }
}
