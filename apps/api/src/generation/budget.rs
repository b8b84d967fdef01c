//! Budget admission control and spend reporting.
//!
//! Admission is a pure decision over a [`BudgetSnapshot`] built from a single
//! read of cost history. Nothing is reserved: spend is recorded after the
//! generation succeeds, so overlapping requests can both pass a nearly-full
//! ceiling.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::request::GenerationRequest;
use crate::models::content::ModelTier;
use crate::models::usage::CostRecord;
use crate::store::ContentStore;

const STANDARD_BASE_COST: f64 = 0.03;
const PREMIUM_BASE_COST: f64 = 0.05;
const VARIANT_COST_MULTIPLIER: f64 = 3.0;

/// Month length used for daily budgets and projections.
const BILLING_DAYS: f64 = 30.0;
const TREND_DAYS: i64 = 7;

// ────────────────────────────────────────────────────────────────────────────
// Policy & snapshot
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetPolicy {
    /// Dollars per month. 0 disables budget control entirely.
    pub monthly_budget: f64,
    /// Calls per day. 0 means no call ceiling.
    pub daily_call_limit: u32,
}

impl BudgetPolicy {
    pub fn new(monthly_budget: f64, daily_call_limit: u32) -> Self {
        Self {
            monthly_budget: monthly_budget.max(0.0),
            daily_call_limit,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.monthly_budget > 0.0
    }

    pub fn daily_budget(&self) -> Option<f64> {
        self.is_enabled().then(|| self.monthly_budget / BILLING_DAYS)
    }

    fn call_limit(&self) -> Option<u32> {
        (self.daily_call_limit > 0).then_some(self.daily_call_limit)
    }
}

/// Spend derived from one read of cost history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetSnapshot {
    pub month_spend: f64,
    pub today_spend: f64,
    /// Every attempt today, successful or not.
    pub today_calls: u32,
}

impl BudgetSnapshot {
    /// Spend only counts successful records; calls count every record.
    pub fn from_records(records: &[CostRecord], now: DateTime<Utc>) -> Self {
        let month_start = month_start(now);
        let today_start = day_start(now);

        records
            .iter()
            .filter(|r| r.created_at >= month_start && r.created_at <= now)
            .fold(Self::default(), |mut snap, r| {
                if r.success {
                    snap.month_spend += r.cost;
                }
                if r.created_at >= today_start {
                    snap.today_calls += 1;
                    if r.success {
                        snap.today_spend += r.cost;
                    }
                }
                snap
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    MonthlyBudget,
    DailyBudget,
    DailyCallLimit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted,
    Denied {
        reason: DenialReason,
        /// Spend (or calls) so far in the period.
        current: f64,
        ceiling: f64,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Decides whether a request costing `estimate` may run.
///
/// Checks the monthly ceiling, then the daily ceiling, then the daily call
/// count. A disabled policy admits everything.
pub fn evaluate(policy: &BudgetPolicy, snapshot: &BudgetSnapshot, estimate: f64) -> Admission {
    if !policy.is_enabled() {
        return Admission::Admitted;
    }

    if snapshot.month_spend + estimate > policy.monthly_budget {
        return Admission::Denied {
            reason: DenialReason::MonthlyBudget,
            current: snapshot.month_spend,
            ceiling: policy.monthly_budget,
        };
    }

    if let Some(daily) = policy.daily_budget() {
        if snapshot.today_spend + estimate > daily {
            return Admission::Denied {
                reason: DenialReason::DailyBudget,
                current: snapshot.today_spend,
                ceiling: daily,
            };
        }
    }

    if let Some(limit) = policy.call_limit() {
        if snapshot.today_calls >= limit {
            return Admission::Denied {
                reason: DenialReason::DailyCallLimit,
                current: snapshot.today_calls as f64,
                ceiling: limit as f64,
            };
        }
    }

    Admission::Admitted
}

/// Flat per-tier cost, scaled up for long targets and variant fan-out.
pub fn estimate_cost(request: &GenerationRequest) -> f64 {
    let mut cost = if request.use_premium {
        PREMIUM_BASE_COST
    } else {
        STANDARD_BASE_COST
    };

    match request.target_length {
        Some(words) if words > 2000 => cost *= 1.5,
        Some(words) if words > 1000 => cost *= 1.2,
        _ => {}
    }

    if request.generate_variants {
        cost *= VARIANT_COST_MULTIPLIER;
    }

    round_to(cost, 4)
}

// ────────────────────────────────────────────────────────────────────────────
// Guard
// ────────────────────────────────────────────────────────────────────────────

/// Store-backed admission control.
#[derive(Clone)]
pub struct BudgetGuard {
    policy: BudgetPolicy,
    store: Arc<dyn ContentStore>,
}

impl BudgetGuard {
    pub fn new(policy: BudgetPolicy, store: Arc<dyn ContentStore>) -> Self {
        if policy.is_enabled() {
            info!(
                monthly = policy.monthly_budget,
                daily = policy.monthly_budget / BILLING_DAYS,
                call_limit = policy.daily_call_limit,
                "Cost control enabled"
            );
        } else {
            info!("Cost control disabled (no monthly budget set)");
        }
        Self { policy, store }
    }

    pub fn policy(&self) -> &BudgetPolicy {
        &self.policy
    }

    pub async fn admit(&self, estimate: f64) -> Result<Admission, AppError> {
        self.admit_at(estimate, Utc::now()).await
    }

    pub async fn admit_at(&self, estimate: f64, now: DateTime<Utc>) -> Result<Admission, AppError> {
        if !self.policy.is_enabled() {
            return Ok(Admission::Admitted);
        }
        let records = self.store.cost_records_since(month_start(now)).await?;
        let snapshot = BudgetSnapshot::from_records(&records, now);
        let admission = evaluate(&self.policy, &snapshot, estimate);

        if let Admission::Denied {
            reason,
            current,
            ceiling,
        } = admission
        {
            warn!(?reason, current, estimate, ceiling, "Budget admission denied");
        }
        Ok(admission)
    }

    pub async fn usage_report(&self) -> Result<UsageReport, AppError> {
        self.usage_report_at(Utc::now()).await
    }

    pub async fn usage_report_at(&self, now: DateTime<Utc>) -> Result<UsageReport, AppError> {
        let trend_start = day_start(now) - Duration::days(TREND_DAYS);
        let since = month_start(now).min(trend_start);
        let records = self.store.cost_records_since(since).await?;
        Ok(build_usage_report(&self.policy, &records, now))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Usage report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub monthly: MonthlyUsage,
    pub daily: DailyUsage,
    pub projections: Projections,
    pub weekly_trend: Vec<DailySpend>,
    pub alerts: Vec<CostAlert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyUsage {
    pub budget: Option<f64>,
    pub spent: f64,
    pub remaining: Option<f64>,
    pub percentage_used: Option<f64>,
    pub requests: u32,
    pub avg_cost_per_request: f64,
    pub premium_cost: f64,
    pub status: SpendingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingStatus {
    Under,
    OnTrack,
    Over,
    NoBudgetSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyUsage {
    pub limit: Option<f64>,
    pub spent: f64,
    pub remaining: Option<f64>,
    pub requests: u32,
    pub api_limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Projections {
    pub projected_monthly_cost: f64,
    pub will_exceed_budget: bool,
    pub days_until_budget_exhausted: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySpend {
    pub date: NaiveDate,
    pub cost: f64,
    pub requests: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostAlert {
    pub level: AlertLevel,
    pub message: String,
}

pub fn build_usage_report(
    policy: &BudgetPolicy,
    records: &[CostRecord],
    now: DateTime<Utc>,
) -> UsageReport {
    let month_start = month_start(now);
    let today_start = day_start(now);
    let successful: Vec<&CostRecord> = records
        .iter()
        .filter(|r| r.success && r.created_at <= now)
        .collect();

    let month: Vec<&CostRecord> = successful
        .iter()
        .copied()
        .filter(|r| r.created_at >= month_start)
        .collect();
    let month_cost: f64 = month.iter().map(|r| r.cost).sum();
    let premium_cost: f64 = month
        .iter()
        .filter(|r| r.model == ModelTier::MultiModel.as_str())
        .map(|r| r.cost)
        .sum();
    let month_requests = month.len() as u32;

    let today: Vec<&CostRecord> = month
        .iter()
        .copied()
        .filter(|r| r.created_at >= today_start)
        .collect();
    let today_cost: f64 = today.iter().map(|r| r.cost).sum();

    let day_of_month = now.day() as f64;
    let projected = month_cost / day_of_month * BILLING_DAYS;

    let (remaining, percentage, status) = if policy.is_enabled() {
        let expected = policy.monthly_budget / BILLING_DAYS * day_of_month;
        let status = if month_cost < expected {
            SpendingStatus::Under
        } else if month_cost > expected * 1.1 {
            SpendingStatus::Over
        } else {
            SpendingStatus::OnTrack
        };
        (
            Some(policy.monthly_budget - month_cost),
            Some(month_cost / policy.monthly_budget * 100.0),
            status,
        )
    } else {
        (None, None, SpendingStatus::NoBudgetSet)
    };

    let average_daily = month_cost / day_of_month;
    let days_until_exhausted = match remaining {
        Some(left) if left > 0.0 && average_daily > 0.0 => Some((left / average_daily) as u32),
        _ => None,
    };

    let daily_limit = policy.daily_budget();

    UsageReport {
        monthly: MonthlyUsage {
            budget: policy.is_enabled().then_some(policy.monthly_budget),
            spent: round_to(month_cost, 2),
            remaining: remaining.map(|r| round_to(r, 2)),
            percentage_used: percentage.map(|p| round_to(p, 1)),
            requests: month_requests,
            avg_cost_per_request: if month_requests > 0 {
                round_to(month_cost / month_requests as f64, 4)
            } else {
                0.0
            },
            premium_cost: round_to(premium_cost, 2),
            status,
        },
        daily: DailyUsage {
            limit: daily_limit.map(|l| round_to(l, 2)),
            spent: round_to(today_cost, 2),
            remaining: daily_limit.map(|l| round_to(l - today_cost, 2)),
            requests: today.len() as u32,
            api_limit: policy.call_limit(),
        },
        projections: Projections {
            projected_monthly_cost: round_to(projected, 2),
            will_exceed_budget: policy.is_enabled() && projected > policy.monthly_budget,
            days_until_budget_exhausted: days_until_exhausted,
        },
        weekly_trend: weekly_trend(&successful, today_start),
        alerts: cost_alerts(policy, month_cost, percentage, projected, now),
    }
}

/// Per-day totals for the last seven days, newest first. Days without spend
/// are omitted.
fn weekly_trend(records: &[&CostRecord], today_start: DateTime<Utc>) -> Vec<DailySpend> {
    let since = today_start - Duration::days(TREND_DAYS);
    let mut by_day: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.created_at >= since) {
        let entry = by_day.entry(r.created_at.date_naive()).or_default();
        entry.0 += r.cost;
        entry.1 += 1;
    }
    by_day
        .into_iter()
        .rev()
        .map(|(date, (cost, requests))| DailySpend {
            date,
            cost: round_to(cost, 2),
            requests,
        })
        .collect()
}

fn cost_alerts(
    policy: &BudgetPolicy,
    month_cost: f64,
    percentage: Option<f64>,
    projected: f64,
    now: DateTime<Utc>,
) -> Vec<CostAlert> {
    let mut alerts = Vec::new();
    if !policy.is_enabled() {
        return alerts;
    }

    if let Some(pct) = percentage {
        let level = if pct >= 95.0 {
            Some(AlertLevel::Critical)
        } else if pct >= 80.0 {
            Some(AlertLevel::Warning)
        } else if pct >= 50.0 {
            Some(AlertLevel::Info)
        } else {
            None
        };
        if let Some(level) = level {
            alerts.push(CostAlert {
                level,
                message: format!("You've used {pct:.1}% of your monthly budget"),
            });
        }
    }

    if projected > policy.monthly_budget {
        alerts.push(CostAlert {
            level: AlertLevel::Warning,
            message: format!(
                "Projected to exceed budget by ${:.2} this month",
                projected - policy.monthly_budget
            ),
        });
    }

    let expected_daily = policy.monthly_budget / BILLING_DAYS;
    let actual_daily = month_cost / now.day() as f64;
    if actual_daily > expected_daily * 1.5 {
        alerts.push(CostAlert {
            level: AlertLevel::Warning,
            message: format!(
                "Spending rate is 50% higher than expected (${actual_daily:.2}/day vs ${expected_daily:.2}/day)"
            ),
        });
    }

    alerts
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
