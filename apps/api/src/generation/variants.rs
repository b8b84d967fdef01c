//! Tone variants for side-by-side comparison.
//!
//! Variants run through the same gateway and shaping as the original but skip
//! budget admission. Each variant that succeeds records its own usage.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::budget::estimate_cost;
use crate::generation::orchestrator::ContentOrchestrator;
use crate::generation::request::{GenerationRequest, Tone};
use crate::generation::text::word_count;
use crate::jobs::Job;
use crate::models::content::ContentStatus;
use crate::models::usage::NewCostRecord;
use crate::models::variant::{NewVariantSet, VariantSet};

pub const VARIANT_PARAMETER: &str = "tone";
const TOKENS_PER_WORD: f64 = 1.3;

/// Up to two sibling requests that differ from `original` only in tone.
pub fn variant_requests(original: &GenerationRequest) -> Vec<GenerationRequest> {
    let mut tones = Vec::with_capacity(2);
    if original.tone != Tone::Enthusiastic {
        tones.push(Tone::Enthusiastic);
    }
    tones.push(if original.tone == Tone::Professional {
        Tone::Conversational
    } else {
        Tone::Professional
    });

    tones
        .into_iter()
        .map(|tone| GenerationRequest {
            generate_variants: false,
            ..original.with_tone(tone)
        })
        .collect()
}

/// Generates and stores the variants of `original_id`.
///
/// Returns the recorded set, or `None` when every variant failed.
pub async fn generate_variants(
    orchestrator: &ContentOrchestrator,
    request: &GenerationRequest,
    original_id: Uuid,
) -> Result<Option<VariantSet>, AppError> {
    let mut ids = vec![original_id];

    for variant in variant_requests(request) {
        let tone = variant.tone.as_str();
        let output = match orchestrator.generate_text(&variant).await {
            Ok(output) => output,
            Err(e) => {
                warn!(%original_id, tone, error = %e, "Variant generation failed, skipping");
                continue;
            }
        };

        let record = match orchestrator
            .produce(&variant, &output, ContentStatus::Variant, Some(original_id))
            .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(%original_id, tone, error = %e, "Failed to store variant, skipping");
                continue;
            }
        };

        let tokens = (word_count(&record.body) as f64 * TOKENS_PER_WORD) as u32;
        orchestrator.jobs().enqueue(Job::RecordUsage(NewCostRecord::succeeded(
            output.tier,
            tokens,
            estimate_cost(&variant),
            variant.category,
            record.id,
        )));
        ids.push(record.id);
    }

    if ids.len() == 1 {
        warn!(%original_id, "No variants were generated");
        return Ok(None);
    }

    let set = orchestrator
        .store()
        .insert_variant_set(NewVariantSet {
            original_id,
            variant_ids: ids,
            parameter: VARIANT_PARAMETER.to_string(),
        })
        .await?;
    info!(%original_id, variants = set.variant_ids.len() - 1, "Variant set recorded");
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::generation::budget::{BudgetGuard, BudgetPolicy};
    use crate::generation::gateway::ProviderGateway;
    use crate::generation::orchestrator::OrchestratorSettings;
    use crate::generation::request::{ContentCategory, Platform};
    use crate::jobs::JobQueue;
    use crate::llm_client::mock::{Scripted, ScriptedProvider};
    use crate::store::memory::MemoryStore;

    fn orchestrator(
        primary: ScriptedProvider,
        policy: BudgetPolicy,
    ) -> (ContentOrchestrator, Arc<MemoryStore>, Arc<ScriptedProvider>) {
        let store = Arc::new(MemoryStore::new());
        let primary = Arc::new(primary);
        let (jobs, _rx) = JobQueue::new(16);
        let orchestrator = ContentOrchestrator::new(
            ProviderGateway::new(primary.clone(), None, 4000),
            BudgetGuard::new(policy, store.clone()),
            store.clone(),
            jobs,
            OrchestratorSettings {
                max_target_words: 5000,
                ..OrchestratorSettings::default()
            },
        );
        (orchestrator, store, primary)
    }

    fn tones(request: &GenerationRequest) -> Vec<Tone> {
        variant_requests(request).iter().map(|r| r.tone).collect()
    }

    #[test]
    fn test_tone_rules() {
        let mut request = GenerationRequest::sample(ContentCategory::Message, "Spring sale");
        request.generate_variants = true;

        request.tone = Tone::Professional;
        assert_eq!(tones(&request), vec![Tone::Enthusiastic, Tone::Conversational]);

        request.tone = Tone::Casual;
        assert_eq!(tones(&request), vec![Tone::Enthusiastic, Tone::Professional]);

        request.tone = Tone::Enthusiastic;
        assert_eq!(tones(&request), vec![Tone::Professional]);

        for variant in variant_requests(&request) {
            assert!(!variant.generate_variants);
            assert_eq!(variant.topic, request.topic);
        }
    }

    #[tokio::test]
    async fn test_variants_are_stored_and_linked() {
        let (orchestrator, store, _) = orchestrator(
            ScriptedProvider::replying("primary", "Fresh deals this spring."),
            BudgetPolicy::new(0.0, 0),
        );
        let mut request = GenerationRequest::sample(ContentCategory::Message, "Spring sale");
        request.platform = Platform::Email;
        let original_id = Uuid::new_v4();

        let set = generate_variants(&orchestrator, &request, original_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(set.variant_ids.len(), 3);
        assert_eq!(set.variant_ids[0], original_id);
        assert_eq!(set.parameter, "tone");

        let stored = store.all_content();
        assert_eq!(stored.len(), 2);
        for row in stored {
            assert_eq!(row.status, "variant");
            assert_eq!(row.metadata.variant_of, Some(original_id));
        }
    }

    #[tokio::test]
    async fn test_one_failed_variant_does_not_abort_the_other() {
        let (orchestrator, store, primary) = orchestrator(
            ScriptedProvider::sequence(
                "primary",
                vec![Scripted::Fail, Scripted::Reply("Professional take".to_string())],
            ),
            BudgetPolicy::new(0.0, 0),
        );
        let request = GenerationRequest::sample(ContentCategory::Message, "Spring sale");
        let original_id = Uuid::new_v4();

        let set = generate_variants(&orchestrator, &request, original_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(set.variant_ids.len(), 2);
        assert_eq!(primary.call_count(), 2);
        assert_eq!(store.all_content().len(), 1);
    }

    #[tokio::test]
    async fn test_no_set_when_every_variant_fails() {
        let (orchestrator, store, _) = orchestrator(
            ScriptedProvider::failing("primary"),
            BudgetPolicy::new(0.0, 0),
        );
        let request = GenerationRequest::sample(ContentCategory::Message, "Spring sale");

        let set = generate_variants(&orchestrator, &request, Uuid::new_v4())
            .await
            .unwrap();
        assert!(set.is_none());
        assert!(store.variant_sets().is_empty());
    }

    #[tokio::test]
    async fn test_variants_skip_budget_admission() {
        // A budget that would deny everything.
        let (orchestrator, store, _) = orchestrator(
            ScriptedProvider::replying("primary", "Still generated"),
            BudgetPolicy::new(0.0001, 0),
        );
        let request = GenerationRequest::sample(ContentCategory::Advertisement, "Flash sale");

        let set = generate_variants(&orchestrator, &request, Uuid::new_v4())
            .await
            .unwrap();
        assert!(set.is_some());
        assert_eq!(store.all_content().len(), 2);
    }
}
