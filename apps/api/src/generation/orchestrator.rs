//! End-to-end generation: validate, estimate, admit, generate, shape, persist,
//! then hand follow-up work to the job queue.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::budget::{estimate_cost, Admission, BudgetGuard, DenialReason};
use crate::generation::gateway::{GatewayError, GatewayOutput, ProviderGateway};
use crate::generation::hashtags::{add_hashtags, build_hashtags, hashtag_config};
use crate::generation::platform;
use crate::generation::quality::assess_quality;
use crate::generation::request::{ContentCategory, GenerationRequest, Platform, Tone};
use crate::generation::seo::seo_score;
use crate::generation::text::word_count;
use crate::jobs::{Job, JobQueue};
use crate::models::content::{ContentMetadata, ContentRecord, ContentStatus, ModelTier, NewContent};
use crate::models::usage::{AnalyticsEvent, NewCostRecord};
use crate::store::ContentStore;

const WORDS_PER_MINUTE: usize = 200;
const TOKENS_PER_WORD: f64 = 1.3;

/// Values the orchestrator needs from configuration.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorSettings {
    pub max_target_words: u32,
    pub content_generated_webhook: Option<String>,
    pub content_published_webhook: Option<String>,
}

/// What a caller gets back from one generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub content_id: Uuid,
    pub category: ContentCategory,
    pub topic: String,
    pub content: String,
    pub platform: Platform,
    pub quality_score: f64,
    pub seo_score: f64,
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub model_tier: ModelTier,
    pub model: String,
    pub premium_used: bool,
    pub processing_time_ms: u64,
    pub estimated_cost: f64,
    pub status: ContentStatus,
    pub hashtags: Vec<String>,
    pub recommendations: Vec<String>,
    pub variants_scheduled: bool,
    pub created_at: DateTime<Utc>,
}

pub struct ContentOrchestrator {
    gateway: ProviderGateway,
    budget: BudgetGuard,
    store: Arc<dyn ContentStore>,
    jobs: JobQueue,
    settings: OrchestratorSettings,
}

impl ContentOrchestrator {
    pub fn new(
        gateway: ProviderGateway,
        budget: BudgetGuard,
        store: Arc<dyn ContentStore>,
        jobs: JobQueue,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            gateway,
            budget,
            store,
            jobs,
            settings,
        }
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    pub fn budget(&self) -> &BudgetGuard {
        &self.budget
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(category = request.category.as_str(), platform = request.platform.as_str()))]
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, AppError> {
        let started = Instant::now();
        let request = request.normalize(self.settings.max_target_words)?;

        let estimate = estimate_cost(&request);
        if let Admission::Denied {
            reason,
            current,
            ceiling,
        } = self.budget.admit(estimate).await?
        {
            return Err(AppError::BudgetExceeded {
                message: denial_message(reason, current, ceiling, estimate),
                current_spend: current,
                ceiling,
            });
        }

        let output = match self.generate_text(&request).await {
            Ok(output) => output,
            Err(e) => {
                self.jobs.enqueue(Job::RecordUsage(NewCostRecord::failed(
                    self.requested_tier(&request),
                    request.category,
                    e.to_string(),
                )));
                return Err(e.into());
            }
        };

        let record = self
            .produce(&request, &output, ContentStatus::Ready, None)
            .await?;

        let words = word_count(&record.body);
        let result = GenerationResult {
            content_id: record.id,
            category: request.category,
            topic: record.topic.clone(),
            content: record.body.clone(),
            platform: request.platform,
            quality_score: record.quality_score,
            seo_score: record.seo_score,
            word_count: words,
            reading_time_minutes: (words / WORDS_PER_MINUTE).max(1),
            model_tier: output.tier,
            model: output.model.clone(),
            premium_used: output.tier == ModelTier::MultiModel,
            processing_time_ms: started.elapsed().as_millis() as u64,
            estimated_cost: estimate,
            status: ContentStatus::Ready,
            hashtags: record.metadata.hashtags.clone(),
            recommendations: recommendations(&request, record.quality_score, record.seo_score),
            variants_scheduled: request.generate_variants,
            created_at: record.created_at,
        };

        info!(
            content_id = %result.content_id,
            quality = result.quality_score,
            seo = result.seo_score,
            words,
            tier = output.tier.as_str(),
            elapsed_ms = result.processing_time_ms,
            "Content generated"
        );

        self.schedule_follow_ups(&request, &result, words);
        Ok(result)
    }

    /// Tier the gateway runs for `request`. Premium without a secondary
    /// provider runs the standard path.
    fn requested_tier(&self, request: &GenerationRequest) -> ModelTier {
        if request.use_premium && self.gateway.has_secondary() {
            ModelTier::MultiModel
        } else {
            ModelTier::Standard
        }
    }

    /// Provider call for a request that has already been admitted.
    pub(crate) async fn generate_text(
        &self,
        request: &GenerationRequest,
    ) -> Result<GatewayOutput, GatewayError> {
        self.gateway.generate(request).await
    }

    /// Scores the raw text, shapes it for the destination and persists it.
    pub(crate) async fn produce(
        &self,
        request: &GenerationRequest,
        output: &GatewayOutput,
        status: ContentStatus,
        variant_of: Option<Uuid>,
    ) -> Result<ContentRecord, AppError> {
        let quality = assess_quality(&output.text, request);
        let seo = seo_score(&output.text, &request.keywords);

        let mut body = output.text.clone();
        let mut generated = Vec::new();
        if request.include_hashtags && request.platform.takes_generated_hashtags() {
            if !body.contains('#') {
                if let Some(config) = hashtag_config(request.platform) {
                    generated = build_hashtags(&request.keywords, &config);
                }
            }
            body = add_hashtags(&body, &request.keywords, request.platform);
        }
        let body = platform::optimize(&body, request.platform, request);
        let hashtags = surviving_tags(generated, &body);

        let record = self
            .store
            .insert_content(NewContent {
                category: request.category,
                topic: request.topic.clone(),
                body,
                metadata: ContentMetadata {
                    keywords: request.keywords.clone(),
                    tone: request.tone,
                    platform: request.platform,
                    target_audience: request.target_audience.clone(),
                    model_tier: output.tier,
                    model: output.model.clone(),
                    premium: request.use_premium,
                    hashtags,
                    variant_of,
                },
                quality_score: quality,
                seo_score: seo,
                status,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist generated content");
                e
            })?;
        Ok(record)
    }

    fn schedule_follow_ups(&self, request: &GenerationRequest, result: &GenerationResult, words: usize) {
        let tokens = (words as f64 * TOKENS_PER_WORD) as u32;
        let single_call_cost = estimate_cost(&GenerationRequest {
            generate_variants: false,
            ..request.clone()
        });

        self.jobs.enqueue(Job::RecordUsage(NewCostRecord::succeeded(
            result.model_tier,
            tokens,
            single_call_cost,
            request.category,
            result.content_id,
        )));

        let event_data = json!({
            "category": request.category,
            "platform": request.platform,
            "quality_score": result.quality_score,
            "seo_score": result.seo_score,
            "word_count": result.word_count,
            "model_tier": result.model_tier,
            "premium": result.premium_used,
        });
        self.jobs.enqueue(Job::TrackEvent(AnalyticsEvent {
            event_type: "content_generated".to_string(),
            content_id: Some(result.content_id),
            data: event_data,
        }));

        if request.generate_variants {
            self.jobs.enqueue(Job::GenerateVariants {
                request: request.clone(),
                original_id: result.content_id,
            });
        }

        if let Some(url) = &self.settings.content_generated_webhook {
            self.jobs.enqueue(Job::Notify {
                url: url.clone(),
                event: "content_generated".to_string(),
                data: json!({
                    "content_id": result.content_id,
                    "category": request.category,
                    "topic": result.topic,
                    "quality_score": result.quality_score,
                }),
            });
        }
    }
}

/// Generated tags still present as whole tokens in the shaped body.
fn surviving_tags(generated: Vec<String>, body: &str) -> Vec<String> {
    generated
        .into_iter()
        .filter(|tag| body.split_whitespace().any(|token| token == tag))
        .collect()
}

fn denial_message(reason: DenialReason, current: f64, ceiling: f64, estimate: f64) -> String {
    match reason {
        DenialReason::MonthlyBudget => format!(
            "Monthly budget exceeded: ${current:.2} spent of ${ceiling:.2}, request would add ${estimate:.2}"
        ),
        DenialReason::DailyBudget => format!(
            "Daily budget exceeded: ${current:.2} spent of ${ceiling:.2}, request would add ${estimate:.2}"
        ),
        DenialReason::DailyCallLimit => {
            format!("Daily API call limit reached: {current:.0} of {ceiling:.0} calls used")
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations
// ────────────────────────────────────────────────────────────────────────────

/// Fixed-threshold advice on how the next request could score better.
pub fn recommendations(request: &GenerationRequest, quality: f64, seo: f64) -> Vec<String> {
    let mut out = Vec::new();

    if quality < 0.7 {
        out.push("Consider adding more specific examples or data points".to_string());
    }
    if quality < 0.8 {
        out.push("Add more engagement elements such as questions or calls-to-action".to_string());
    }
    if seo < 0.6 {
        out.push("Include more target keywords naturally throughout the content".to_string());
    }
    if seo < 0.7 {
        out.push("Use keywords in headers and the opening paragraph".to_string());
    }
    if matches!(request.target_length, Some(words) if words < 300) {
        out.push("Longer content (300+ words) tends to rank better in search".to_string());
    }
    if request.platform == Platform::Instagram && !request.include_hashtags {
        out.push("Enable hashtags to increase reach on Instagram".to_string());
    }
    if request.platform == Platform::Linkedin && request.tone == Tone::Casual {
        out.push("Consider a more professional tone for LinkedIn".to_string());
    }
    if !request.use_premium && (quality < 0.85 || seo < 0.85) {
        out.push("Try premium multi-model generation for higher quality".to_string());
    }
    if !request.generate_variants
        && matches!(
            request.category,
            ContentCategory::Message | ContentCategory::Advertisement
        )
    {
        out.push("Enable A/B variants to test which version performs best".to_string());
    }

    if out.is_empty() {
        out.push("Excellent content! Ready to publish.".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::budget::BudgetPolicy;
    use crate::llm_client::mock::{Scripted, ScriptedProvider};
    use crate::llm_client::TextProvider;
    use crate::models::usage::CostRecord;
    use crate::store::memory::MemoryStore;
    use tokio::sync::mpsc;

    struct Harness {
        orchestrator: ContentOrchestrator,
        store: Arc<MemoryStore>,
        primary: Arc<ScriptedProvider>,
        rx: mpsc::Receiver<Job>,
    }

    fn harness_with(
        primary: ScriptedProvider,
        secondary: Option<ScriptedProvider>,
        store: MemoryStore,
        policy: BudgetPolicy,
    ) -> Harness {
        let store = Arc::new(store);
        let primary = Arc::new(primary);
        let gateway = ProviderGateway::new(
            primary.clone(),
            secondary.map(|s| Arc::new(s) as Arc<dyn TextProvider>),
            4000,
        );
        let budget = BudgetGuard::new(policy, store.clone());
        let (jobs, rx) = JobQueue::new(64);
        let orchestrator = ContentOrchestrator::new(
            gateway,
            budget,
            store.clone(),
            jobs,
            OrchestratorSettings {
                max_target_words: 5000,
                ..OrchestratorSettings::default()
            },
        );
        Harness {
            orchestrator,
            store,
            primary,
            rx,
        }
    }

    fn harness(reply: &str) -> Harness {
        harness_with(
            ScriptedProvider::replying("primary", reply),
            None,
            MemoryStore::new(),
            BudgetPolicy::new(0.0, 0),
        )
    }

    fn drain(rx: &mut mpsc::Receiver<Job>) -> Vec<Job> {
        let mut jobs = Vec::new();
        while let Ok(job) = rx.try_recv() {
            jobs.push(job);
        }
        jobs
    }

    fn gardening_article(words: usize) -> String {
        let sentence = "Urban gardening on balcony plants rewards patience and good light.";
        let per_sentence = sentence.split_whitespace().count();
        let mut body = String::from("## Getting started\n\n");
        for i in 0..(words / per_sentence) {
            body.push_str(sentence);
            body.push(if i % 8 == 7 { '\n' } else { ' ' });
        }
        body.push_str("\n\nWhat will you plant first? Start today.");
        body
    }

    fn gardening_request() -> GenerationRequest {
        let mut request =
            GenerationRequest::sample(ContentCategory::Article, "10 tips for urban gardening");
        request.keywords = vec!["urban gardening".to_string(), "balcony plants".to_string()];
        request.tone = Tone::Professional;
        request.platform = Platform::Blog;
        request.target_length = Some(800);
        request
    }

    #[tokio::test]
    async fn test_blog_article_is_scored_and_ready() {
        let mut h = harness(&gardening_article(800));
        let result = h.orchestrator.generate(gardening_request()).await.unwrap();

        assert!(result.word_count >= 700 && result.word_count <= 900, "{}", result.word_count);
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert!(result.seo_score > 0.0 && result.seo_score <= 1.0);
        assert_eq!(result.status, ContentStatus::Ready);
        assert_eq!(result.model_tier, ModelTier::Standard);
        assert_eq!(result.reading_time_minutes, result.word_count / 200);

        let stored = h.store.all_content();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, "ready");

        let jobs = drain(&mut h.rx);
        assert!(jobs
            .iter()
            .any(|j| matches!(j, Job::RecordUsage(r) if r.success && r.content_id == Some(result.content_id))));
        assert!(jobs
            .iter()
            .any(|j| matches!(j, Job::TrackEvent(e) if e.event_type == "content_generated")));
        assert!(!jobs.iter().any(|j| matches!(j, Job::GenerateVariants { .. })));
    }

    #[tokio::test]
    async fn test_twitter_post_gets_hashtags_within_ceiling() {
        let long_reply = "Urban gardening turns any balcony into a harvest. ".repeat(10);
        let h = harness(&long_reply);
        let mut request = gardening_request();
        request.platform = Platform::Twitter;
        request.target_length = None;
        request.include_hashtags = true;

        let result = h.orchestrator.generate(request).await.unwrap();
        assert!(result.content.chars().count() <= 280, "{}", result.content);
        assert_eq!(result.hashtags, vec!["#Urbangardening", "#Balconyplants"]);
        assert!(result.content.contains("#Urbangardening"));
    }

    #[tokio::test]
    async fn test_budget_denial_surfaces_spend_and_skips_providers() {
        let store = MemoryStore::new();
        store.push_cost(CostRecord {
            id: Uuid::new_v4(),
            model: "standard".to_string(),
            tokens_used: 1000,
            cost: 0.97,
            category: "article".to_string(),
            success: true,
            error_message: None,
            content_id: None,
            created_at: Utc::now(),
        });
        let h = harness_with(
            ScriptedProvider::replying("primary", "unused"),
            None,
            store,
            BudgetPolicy::new(1.0, 0),
        );
        let mut request = gardening_request();
        request.use_premium = true; // estimate 0.05

        let err = h.orchestrator.generate(request).await.unwrap_err();
        match err {
            AppError::BudgetExceeded {
                current_spend,
                ceiling,
                ..
            } => {
                assert!((current_spend - 0.97).abs() < 1e-9);
                assert_eq!(ceiling, 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(h.primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_premium_without_secondary_runs_standard() {
        let h = harness("A plain standard draft about urban gardening.");
        let mut request = gardening_request();
        request.use_premium = true;

        let result = h.orchestrator.generate(request).await.unwrap();
        assert_eq!(result.model_tier, ModelTier::Standard);
        assert!(!result.premium_used);
        assert_eq!(h.primary.call_count(), 1);
    }

    #[tokio::test]
    async fn test_premium_with_both_providers_is_multi_model() {
        let h = harness_with(
            ScriptedProvider::sequence(
                "primary",
                vec![
                    Scripted::Reply("Draft one".to_string()),
                    Scripted::Reply("Merged draft".to_string()),
                ],
            ),
            Some(ScriptedProvider::replying("secondary", "Draft two")),
            MemoryStore::new(),
            BudgetPolicy::new(0.0, 0),
        );
        let mut request = gardening_request();
        request.use_premium = true;

        let result = h.orchestrator.generate(request).await.unwrap();
        assert_eq!(result.content, "Merged draft");
        assert!(result.premium_used);
        assert_eq!(result.model_tier, ModelTier::MultiModel);
    }

    #[tokio::test]
    async fn test_provider_failure_records_failed_usage() {
        let mut h = harness_with(
            ScriptedProvider::failing("primary"),
            None,
            MemoryStore::new(),
            BudgetPolicy::new(0.0, 0),
        );
        let err = h.orchestrator.generate(gardening_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));

        let jobs = drain(&mut h.rx);
        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            Job::RecordUsage(record) => {
                assert!(!record.success);
                assert_eq!(record.cost, 0.0);
                assert!(record.content_id.is_none());
            }
            other => panic!("unexpected job: {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_failed_premium_without_secondary_is_recorded_as_standard() {
        let mut h = harness_with(
            ScriptedProvider::failing("primary"),
            None,
            MemoryStore::new(),
            BudgetPolicy::new(0.0, 0),
        );
        let mut request = gardening_request();
        request.use_premium = true;
        h.orchestrator.generate(request).await.unwrap_err();

        let jobs = drain(&mut h.rx);
        assert!(matches!(
            jobs.as_slice(),
            [Job::RecordUsage(r)] if r.tier == ModelTier::Standard && !r.success
        ));
    }

    #[tokio::test]
    async fn test_hashtag_metadata_matches_shaped_body() {
        // LinkedIn places tags after the body; the ceiling cuts them off.
        let h = harness(&"Grow herbs on any balcony with care. ".repeat(100));
        let mut request = gardening_request();
        request.platform = Platform::Linkedin;
        request.target_length = None;

        let result = h.orchestrator.generate(request).await.unwrap();
        assert!(result.content.chars().count() <= 3000);
        assert!(!result.content.contains('#'));
        assert!(result.hashtags.is_empty());
        assert!(h.store.all_content()[0].metadata.hashtags.is_empty());
    }

    #[test]
    fn test_surviving_tags_requires_whole_token() {
        let generated = vec!["#Basil".to_string(), "#Balconyplants".to_string()];
        let kept = surviving_tags(generated, "Fresh herbs #Basil #Balconypl...");
        assert_eq!(kept, vec!["#Basil".to_string()]);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_fatal() {
        let h = harness_with(
            ScriptedProvider::replying("primary", "Some draft"),
            None,
            MemoryStore::failing_content_writes(),
            BudgetPolicy::new(0.0, 0),
        );
        let err = h.orchestrator.generate(gardening_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_generation() {
        let h = harness("unused");
        let request = GenerationRequest::sample(ContentCategory::Article, "abc");
        let err = h.orchestrator.generate(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(h.primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_variants_requested_are_scheduled() {
        let mut h = harness("Variant-worthy email copy.");
        let mut request = GenerationRequest::sample(ContentCategory::Message, "Spring sale launch");
        request.generate_variants = true;

        let result = h.orchestrator.generate(request).await.unwrap();
        assert!(result.variants_scheduled);
        assert!((result.estimated_cost - 0.09).abs() < 1e-9);

        let jobs = drain(&mut h.rx);
        assert!(jobs.iter().any(
            |j| matches!(j, Job::GenerateVariants { original_id, .. } if *original_id == result.content_id)
        ));
        // usage is recorded at single-call cost, variants record their own
        assert!(jobs
            .iter()
            .any(|j| matches!(j, Job::RecordUsage(r) if (r.cost - 0.03).abs() < 1e-9)));
    }

    #[test]
    fn test_recommendations_thresholds() {
        let request = gardening_request();
        let low = recommendations(&request, 0.5, 0.5);
        assert!(low.iter().any(|r| r.contains("examples or data")));
        assert!(low.iter().any(|r| r.contains("engagement")));
        assert!(low.iter().any(|r| r.contains("more target keywords")));
        assert!(low.iter().any(|r| r.contains("headers")));
        assert!(low.iter().any(|r| r.contains("premium")));

        let mut premium = request.clone();
        premium.use_premium = true;
        assert_eq!(
            recommendations(&premium, 0.9, 0.9),
            vec!["Excellent content! Ready to publish.".to_string()]
        );
    }

    #[test]
    fn test_recommendations_platform_rules() {
        let mut request = gardening_request();
        request.use_premium = true;
        request.platform = Platform::Linkedin;
        request.tone = Tone::Casual;
        assert!(recommendations(&request, 0.9, 0.9)
            .iter()
            .any(|r| r.contains("LinkedIn")));

        request.platform = Platform::Instagram;
        request.include_hashtags = false;
        assert!(recommendations(&request, 0.9, 0.9)
            .iter()
            .any(|r| r.contains("Instagram")));

        let mut short_ad = GenerationRequest::sample(ContentCategory::Advertisement, "Flash sale");
        short_ad.use_premium = true;
        short_ad.target_length = Some(100);
        let recs = recommendations(&short_ad, 0.9, 0.9);
        assert!(recs.iter().any(|r| r.contains("300+ words")));
        assert!(recs.iter().any(|r| r.contains("A/B variants")));
    }
}
