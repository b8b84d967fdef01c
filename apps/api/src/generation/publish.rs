//! Publish preparation: per-platform validated copy and an optional posting
//! time. Nothing is posted to third parties.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::orchestrator::ContentOrchestrator;
use crate::generation::platform::validate;
use crate::generation::request::Platform;
use crate::generation::text::{char_len, truncate_chars};
use crate::jobs::Job;
use crate::models::usage::AnalyticsEvent;

pub const MAX_PUBLISH_PLATFORMS: usize = 5;
const PREVIEW_CHARS: usize = 100;
const FALLBACK_HOUR: u32 = 14;

#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub content_id: Uuid,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub schedule_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_optimize_timing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Scheduled,
    ReadyToPublish,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformPublication {
    pub platform: Platform,
    pub status: PublishStatus,
    pub content: String,
    pub preview: String,
    pub character_count: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub content_id: Uuid,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub platforms: Vec<PlatformPublication>,
}

/// Best posting hours (UTC) per platform.
fn best_hours(platform: Platform) -> &'static [u32] {
    match platform {
        Platform::Twitter => &[13, 17],
        Platform::Linkedin => &[10, 12, 17],
        Platform::Instagram => &[11, 13, 19],
        Platform::Facebook => &[12, 15, 19],
        Platform::Youtube => &[14, 18],
        Platform::Tiktok => &[18, 21],
        Platform::Pinterest => &[20, 23],
        Platform::Blog | Platform::Email => &[],
    }
}

/// Tomorrow at the hour most platforms agree on. Ties go to the hour seen
/// first; 14:00 when no platform has data.
pub fn optimal_posting_time(platforms: &[Platform], now: DateTime<Utc>) -> DateTime<Utc> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    let mut order: Vec<u32> = Vec::new();
    for hour in platforms.iter().flat_map(|p| best_hours(*p)) {
        let count = counts.entry(*hour).or_insert(0);
        if *count == 0 {
            order.push(*hour);
        }
        *count += 1;
    }

    let mut best: Option<(u32, usize)> = None;
    for hour in order {
        let count = counts[&hour];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((hour, count));
        }
    }
    let hour = best.map_or(FALLBACK_HOUR, |(h, _)| h);

    let tomorrow = (now + Duration::days(1)).date_naive();
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    tomorrow.and_time(time).and_utc()
}

/// Prepares stored content for each requested platform.
pub async fn prepare_publication(
    orchestrator: &ContentOrchestrator,
    request: PublishRequest,
    now: DateTime<Utc>,
) -> Result<PublishResponse, AppError> {
    let platforms = dedup_platforms(&request.platforms);
    if platforms.is_empty() || platforms.len() > MAX_PUBLISH_PLATFORMS {
        return Err(AppError::Validation(format!(
            "between 1 and {MAX_PUBLISH_PLATFORMS} platforms are required"
        )));
    }

    let content = orchestrator
        .store()
        .get_content(request.content_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {} not found", request.content_id)))?;

    let scheduled_time = match request.schedule_time {
        Some(time) => Some(time),
        None if request.auto_optimize_timing => Some(optimal_posting_time(&platforms, now)),
        None => None,
    };
    let status = if scheduled_time.is_some() {
        PublishStatus::Scheduled
    } else {
        PublishStatus::ReadyToPublish
    };

    let original_len = char_len(&content.body);
    let publications: Vec<PlatformPublication> = platforms
        .iter()
        .map(|platform| {
            let text = validate(&content.body, *platform);
            let character_count = char_len(&text);
            PlatformPublication {
                platform: *platform,
                status,
                preview: truncate_chars(&text, PREVIEW_CHARS).to_string(),
                truncated: character_count < original_len,
                character_count,
                content: text,
            }
        })
        .collect();

    info!(
        content_id = %content.id,
        platforms = publications.len(),
        scheduled = scheduled_time.is_some(),
        "Content prepared for publishing"
    );

    let platform_names: Vec<&str> = platforms.iter().map(|p| p.as_str()).collect();
    let jobs = orchestrator.jobs();
    jobs.enqueue(Job::TrackEvent(AnalyticsEvent {
        event_type: "content_published".to_string(),
        content_id: Some(content.id),
        data: json!({
            "platforms": platform_names,
            "scheduled_time": scheduled_time,
        }),
    }));
    if let Some(url) = &orchestrator.settings().content_published_webhook {
        jobs.enqueue(Job::Notify {
            url: url.clone(),
            event: "content_published".to_string(),
            data: json!({
                "content_id": content.id,
                "platforms": platform_names,
                "scheduled_time": scheduled_time,
            }),
        });
    }

    Ok(PublishResponse {
        content_id: content.id,
        scheduled_time,
        platforms: publications,
    })
}

/// Keeps the first occurrence of each platform.
fn dedup_platforms(platforms: &[Platform]) -> Vec<Platform> {
    let mut out: Vec<Platform> = Vec::with_capacity(platforms.len());
    for platform in platforms {
        if !out.contains(platform) {
            out.push(*platform);
        }
    }
    out
}
