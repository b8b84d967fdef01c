//! Analytics dashboard: library volume, score distribution, spend and event
//! counts over a trailing window of days.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::budget::round_to;
use crate::models::content::ModelTier;
use crate::models::usage::{ContentStat, CostRecord, EventCount};
use crate::store::ContentStore;

pub const DEFAULT_DASHBOARD_DAYS: u32 = 30;
pub const MAX_DASHBOARD_DAYS: u32 = 365;
const HIGH_QUALITY: f64 = 0.8;

fn default_days() -> u32 {
    DEFAULT_DASHBOARD_DAYS
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub period_days: u32,
    pub summary: DashboardSummary,
    pub by_category: Vec<Breakdown>,
    pub by_platform: Vec<Breakdown>,
    pub quality_distribution: QualityDistribution,
    pub high_quality_percentage: f64,
    pub costs: CostSummary,
    pub events: Vec<EventCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_content: u32,
    pub avg_quality_score: f64,
    pub avg_seo_score: f64,
    pub active_days: u32,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub key: String,
    pub count: u32,
    pub avg_quality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub needs_improvement: u32,
}

impl QualityDistribution {
    fn record(&mut self, score: f64) {
        match score {
            s if s >= 0.85 => self.excellent += 1,
            s if s >= 0.70 => self.good += 1,
            s if s >= 0.50 => self.average += 1,
            _ => self.needs_improvement += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub avg_cost_per_content: f64,
    pub total_calls: u32,
    pub successful_calls: u32,
    /// Percent of calls that succeeded; 0 with no calls.
    pub success_rate: f64,
    pub premium_cost: f64,
    pub estimated_monthly: f64,
}

/// Loads the window from the store and aggregates it.
pub async fn dashboard_metrics(
    store: &dyn ContentStore,
    days: u32,
    now: DateTime<Utc>,
) -> Result<DashboardMetrics, AppError> {
    if !(1..=MAX_DASHBOARD_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {MAX_DASHBOARD_DAYS}"
        )));
    }
    let since = now - Duration::days(i64::from(days));
    let content = store.content_stats_since(since).await?;
    let costs = store.cost_records_since(since).await?;
    let events = store.event_counts_since(since).await?;
    Ok(summarize(days, &content, &costs, events))
}

pub fn summarize(
    days: u32,
    content: &[ContentStat],
    costs: &[CostRecord],
    events: Vec<EventCount>,
) -> DashboardMetrics {
    let total = content.len() as u32;
    let per_piece = f64::from(total.max(1));

    let mut distribution = QualityDistribution::default();
    for row in content {
        distribution.record(row.quality_score);
    }
    let high_quality = content
        .iter()
        .filter(|c| c.quality_score > HIGH_QUALITY)
        .count() as f64;
    let active_days: HashSet<_> = content.iter().map(|c| c.created_at.date_naive()).collect();

    let total_cost: f64 = costs.iter().map(|r| r.cost).sum();
    let successful = costs.iter().filter(|r| r.success).count() as u32;
    let premium_cost: f64 = costs
        .iter()
        .filter(|r| r.model == ModelTier::MultiModel.as_str())
        .map(|r| r.cost)
        .sum();

    DashboardMetrics {
        period_days: days,
        summary: DashboardSummary {
            total_content: total,
            avg_quality_score: round_to(mean(content.iter().map(|c| c.quality_score)), 3),
            avg_seo_score: round_to(mean(content.iter().map(|c| c.seo_score)), 3),
            active_days: active_days.len() as u32,
            total_cost: round_to(total_cost, 2),
        },
        by_category: breakdown(content.iter().map(|c| (c.category.clone(), c.quality_score))),
        by_platform: breakdown(
            content
                .iter()
                .filter_map(|c| c.platform.clone().map(|p| (p, c.quality_score))),
        ),
        quality_distribution: distribution,
        high_quality_percentage: round_to(high_quality / per_piece * 100.0, 1),
        costs: CostSummary {
            total_cost: round_to(total_cost, 2),
            avg_cost_per_content: round_to(total_cost / per_piece, 4),
            total_calls: costs.len() as u32,
            successful_calls: successful,
            success_rate: if costs.is_empty() {
                0.0
            } else {
                round_to(f64::from(successful) / costs.len() as f64 * 100.0, 1)
            },
            premium_cost: round_to(premium_cost, 2),
            estimated_monthly: round_to(total_cost / f64::from(days.max(1)) * 30.0, 2),
        },
        events,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u32), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / f64::from(n)
    }
}

/// Count and mean quality per key, largest group first.
fn breakdown(rows: impl Iterator<Item = (String, f64)>) -> Vec<Breakdown> {
    let mut groups: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    for (key, quality) in rows {
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        entry.1 += quality;
    }
    let mut out: Vec<Breakdown> = groups
        .into_iter()
        .map(|(key, (count, sum))| Breakdown {
            key,
            count,
            avg_quality: round_to(sum / f64::from(count), 2),
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
